/// Request lifecycle of one mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Settled,
}

/// Stamp handed out when a submission starts. Settling with a ticket from an
/// older generation is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    phase: Phase,
    generation: u64,
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    /// `None` while a request is already in flight.
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.is_pending() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Pending;
        Some(Ticket {
            generation: self.generation,
        })
    }

    /// Returns false for stale tickets, leaving the phase untouched.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = Phase::Settled;
        true
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.is_pending() && ticket.generation == self.generation
    }

    /// Invalidates any outstanding ticket. A pending mode drops back to idle.
    pub fn teardown(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.phase == Phase::Pending {
            self.phase = Phase::Idle;
        }
    }
}
