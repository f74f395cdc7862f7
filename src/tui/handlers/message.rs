use crate::gateway::Completion;
use crate::tui::types::{App, TuiMsg};

pub fn handle_tui_msg(app: &mut App, msg: TuiMsg) {
    match msg {
        TuiMsg::Optimized(ticket, res) => {
            let status = settled_status("Optimized", &res);
            if app.studio.content.settle_optimize(ticket, res) {
                app.status = status;
            } else {
                tracing::debug!(?ticket, "dropped stale optimization");
            }
        }
        TuiMsg::Titles(ticket, res) => {
            let status = settled_status("Titles ready", &res);
            if app.studio.content.settle_titles(ticket, res) {
                app.status = status;
            } else {
                tracing::debug!(?ticket, "dropped stale titles");
            }
        }
        TuiMsg::Analyzed(ticket, res) => {
            let status = settled_status("Analysis ready", &res);
            if app.studio.media.settle_analyze(ticket, res) {
                app.status = status;
            } else {
                tracing::debug!(?ticket, "dropped stale analysis");
            }
        }
        TuiMsg::ChatReply(ticket, res) => {
            let status = settled_status("Reply received", &res);
            if app.studio.chat.settle_turn(ticket, res) {
                app.status = status;
                app.chat_scroll = 0;
            } else {
                tracing::debug!(?ticket, "dropped stale chat reply");
            }
        }
    }
}

fn settled_status<T>(done: &str, res: &Completion<T>) -> String {
    match res.failure() {
        None => format!("{done}."),
        Some(reason) => format!("{done} with fallback ({reason})."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{ScriptedProvider, gateway_with};
    use crate::gateway::{Failure, Platform};
    use crate::studio::{Phase, Studio};

    fn app() -> App {
        let provider = ScriptedProvider::new();
        let gateway = gateway_with(&provider);
        App::new(Studio::new(Platform::TikTok), gateway)
    }

    #[test]
    fn matching_ticket_settles_the_mode() {
        let mut app = app();
        app.studio.content.input = "draft".to_string();
        let job = app.studio.content.begin_optimize().unwrap();

        handle_tui_msg(
            &mut app,
            TuiMsg::Optimized(job.ticket, Completion::Ok("better".to_string())),
        );

        assert_eq!(app.studio.content.phase(), Phase::Settled);
        assert_eq!(app.status, "Optimized.");
    }

    #[test]
    fn late_reply_after_teardown_is_dropped() {
        let mut app = app();
        app.studio.content.input = "draft".to_string();
        let job = app.studio.content.begin_titles().unwrap();
        app.studio.teardown();
        let before = app.status.clone();

        handle_tui_msg(
            &mut app,
            TuiMsg::Titles(job.ticket, Completion::Error(Failure::Provider("x".into()))),
        );

        assert!(app.studio.content.titles().is_none());
        assert_eq!(app.studio.content.phase(), Phase::Idle);
        assert_eq!(app.status, before);
    }

    #[test]
    fn fallback_is_named_in_status() {
        let res = Completion::Fallback {
            reason: Failure::Shape("empty".into()),
            value: "Analysis failed.".to_string(),
        };
        assert_eq!(
            settled_status("Analysis ready", &res),
            "Analysis ready with fallback (unexpected response: empty)."
        );
    }
}
