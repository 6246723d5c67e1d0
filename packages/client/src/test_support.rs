//! Scripted transport shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wikiquery::{Action, Query};
use wikiquery_api::ApiResponse;

use crate::client::WikiClient;
use crate::endpoint::Endpoint;
use crate::error::TransportError;
use crate::sink::RecordingSink;
use crate::transport::Transport;

pub const TEST_ENDPOINT: &str = "https://wiki.example.org/w/api.php";

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<ApiResponse, TransportError>>,
    seen: Vec<(Action, Query)>,
}

/// Replays canned replies in order. Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<ApiResponse, TransportError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                replies: replies.into(),
                seen: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> usize {
        self.script.lock().unwrap().seen.len()
    }

    pub fn seen(&self) -> Vec<(Action, Query)> {
        self.script.lock().unwrap().seen.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(
        &self,
        endpoint: &Endpoint,
        action: Action,
        query: &Query,
    ) -> Result<ApiResponse, TransportError> {
        assert_eq!(endpoint.as_str(), TEST_ENDPOINT);
        let mut script = self.script.lock().unwrap();
        script.seen.push((action, query.clone()));
        script
            .replies
            .pop_front()
            .expect("transport called more often than scripted")
    }
}

pub fn client_with(transport: ScriptedTransport, sink: Arc<RecordingSink>) -> WikiClient {
    WikiClient::new(Endpoint::parse(TEST_ENDPOINT).unwrap(), Arc::new(transport)).with_sink(sink)
}
