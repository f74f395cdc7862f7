// Gateway calls run on their own tasks and report back over the channel.
// Controllers are only touched on the UI loop.

use tokio::sync::mpsc;

use crate::gateway::Gateway;
use crate::studio::{AnalyzeJob, OptimizeJob, TitlesJob, TurnJob};
use crate::tui::types::TuiMsg;

pub fn spawn_optimize(gateway: Gateway, tx: mpsc::UnboundedSender<TuiMsg>, job: OptimizeJob) {
    tokio::spawn(async move {
        let res = gateway.optimize(&job.text, job.platform).await;
        let _ = tx.send(TuiMsg::Optimized(job.ticket, res));
    });
}

pub fn spawn_titles(gateway: Gateway, tx: mpsc::UnboundedSender<TuiMsg>, job: TitlesJob) {
    tokio::spawn(async move {
        let res = gateway.suggest_titles(&job.topic).await;
        let _ = tx.send(TuiMsg::Titles(job.ticket, res));
    });
}

pub fn spawn_analyze(gateway: Gateway, tx: mpsc::UnboundedSender<TuiMsg>, job: AnalyzeJob) {
    tokio::spawn(async move {
        let res = gateway
            .analyze_media(&job.bytes, &job.mime_type, job.prompt)
            .await;
        let _ = tx.send(TuiMsg::Analyzed(job.ticket, res));
    });
}

pub fn spawn_turn(gateway: Gateway, tx: mpsc::UnboundedSender<TuiMsg>, job: TurnJob) {
    tokio::spawn(async move {
        let res = gateway.send_turn(&job.session, &job.message).await;
        let _ = tx.send(TuiMsg::ChatReply(job.ticket, res));
    });
}
