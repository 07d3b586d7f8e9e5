//! In-memory sources for exercising the async paths without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{FetchError, OverrideChannelError};
use crate::models::{ChatReply, ChatRequest, Property, ResultPage};
use crate::query::QueryParams;
use crate::sources::{ChatSource, ListingSource};

pub(crate) fn page(ids: &[&str], total: u64) -> ResultPage {
    ResultPage::new(
        ids.iter()
            .map(|id| Property::new(*id, format!("Listing {id}")))
            .collect(),
        total,
    )
}

type Key = (Option<String>, u64);

fn key(city: Option<&str>, offset: u64) -> Key {
    (city.map(str::to_string), offset)
}

/// Replays queued responses per (city, offset); gated keys wait for a notify.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<HashMap<Key, VecDeque<Result<ResultPage, FetchError>>>>,
    gates: Mutex<HashMap<Key, Arc<Notify>>>,
    calls: Mutex<Vec<QueryParams>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(
        &self,
        city: Option<&str>,
        offset: u64,
        response: Result<ResultPage, FetchError>,
    ) {
        self.responses
            .lock()
            .unwrap()
            .entry(key(city, offset))
            .or_default()
            .push_back(response);
    }

    /// Hold responses for this key until the returned gate is notified.
    pub(crate) fn gate(&self, city: Option<&str>, offset: u64) -> Arc<Notify> {
        Arc::clone(
            self.gates
                .lock()
                .unwrap()
                .entry(key(city, offset))
                .or_default(),
        )
    }

    pub(crate) fn calls(&self) -> Vec<QueryParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingSource for ScriptedSource {
    async fn fetch_page(&self, params: &QueryParams) -> Result<ResultPage, FetchError> {
        self.calls.lock().unwrap().push(params.clone());
        let key = key(params.city.as_deref(), params.offset);

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(FetchError::Network(format!("no scripted response for {key:?}"))))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Chat backend returning queued replies in order
#[derive(Default)]
pub(crate) struct ScriptedChat {
    replies: Mutex<VecDeque<Result<ChatReply, OverrideChannelError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, reply: Result<ChatReply, OverrideChannelError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSource for ScriptedChat {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, OverrideChannelError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OverrideChannelError::Network("no scripted reply".to_string())))
    }
}
