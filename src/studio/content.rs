use crate::gateway::{Completion, Gateway, Platform, TitleList};

use super::state::{Lifecycle, Phase, Ticket};

#[derive(Debug, Clone)]
pub struct OptimizeJob {
    pub ticket: Ticket,
    pub text: String,
    pub platform: Platform,
}

#[derive(Debug, Clone)]
pub struct TitlesJob {
    pub ticket: Ticket,
    pub topic: String,
}

/// Content engine mode: one draft, two actions (rewrite for a platform,
/// suggest titles) sharing a single in-flight slot.
#[derive(Debug, Default)]
pub struct ContentEngine {
    pub input: String,
    pub platform: Platform,
    life: Lifecycle,
    optimized: Option<Completion<String>>,
    titles: Option<Completion<TitleList>>,
}

impl ContentEngine {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.life.phase()
    }

    pub fn is_pending(&self) -> bool {
        self.life.is_pending()
    }

    pub fn optimized(&self) -> Option<&Completion<String>> {
        self.optimized.as_ref()
    }

    pub fn titles(&self) -> Option<&Completion<TitleList>> {
        self.titles.as_ref()
    }

    pub fn begin_optimize(&mut self) -> Option<OptimizeJob> {
        if self.input.trim().is_empty() {
            return None;
        }
        let ticket = self.life.begin()?;
        Some(OptimizeJob {
            ticket,
            text: self.input.clone(),
            platform: self.platform,
        })
    }

    pub fn begin_titles(&mut self) -> Option<TitlesJob> {
        if self.input.trim().is_empty() {
            return None;
        }
        let ticket = self.life.begin()?;
        Some(TitlesJob {
            ticket,
            topic: self.input.clone(),
        })
    }

    /// The previous answer stays in place until this call replaces it.
    pub fn settle_optimize(&mut self, ticket: Ticket, result: Completion<String>) -> bool {
        if !self.life.settle(ticket) {
            return false;
        }
        self.optimized = Some(result);
        true
    }

    pub fn settle_titles(&mut self, ticket: Ticket, result: Completion<TitleList>) -> bool {
        if !self.life.settle(ticket) {
            return false;
        }
        self.titles = Some(result);
        true
    }

    pub async fn optimize(&mut self, gateway: &Gateway) -> bool {
        let Some(job) = self.begin_optimize() else {
            return false;
        };
        let result = gateway.optimize(&job.text, job.platform).await;
        self.settle_optimize(job.ticket, result)
    }

    pub async fn suggest_titles(&mut self, gateway: &Gateway) -> bool {
        let Some(job) = self.begin_titles() else {
            return false;
        };
        let result = gateway.suggest_titles(&job.topic).await;
        self.settle_titles(job.ticket, result)
    }

    pub fn teardown(&mut self) {
        self.life.teardown();
    }
}
