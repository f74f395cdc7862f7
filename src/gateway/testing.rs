// Scripted provider for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use serde_json::{Value, json};

use super::{Gateway, Provider};
use crate::config::ModelSet;
use crate::errors::CliError;

#[derive(Default)]
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Value, CliError>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply_text(&self, text: &str) {
        self.reply_raw(candidate(text));
    }

    pub(crate) fn reply_raw(&self, payload: Value) {
        self.replies.lock().unwrap().push_back(Ok(payload));
    }

    pub(crate) fn fail(&self, err: CliError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> Option<(String, Value)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Provider for ScriptedProvider {
    fn generate<'a>(&'a self, model: &'a str, body: Value) -> BoxFuture<'a, Result<Value, CliError>> {
        self.requests.lock().unwrap().push((model.to_string(), body));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CliError::Network("no scripted reply".to_string())));
        Box::pin(async move { reply })
    }
}

pub(crate) fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

pub(crate) fn gateway_with(provider: &Arc<ScriptedProvider>) -> Gateway {
    Gateway::new(
        provider.clone(),
        ModelSet {
            fast: "fast-model".to_string(),
            pro: "pro-model".to_string(),
        },
    )
}
