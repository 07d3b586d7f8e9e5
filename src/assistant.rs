//! Natural-language search that can take over the visible result list.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::controller::SearchController;
use crate::error::OverrideChannelError;
use crate::models::ChatRequest;
use crate::sources::{ChatSource, ListingSource};

const FAILURE_REPLY: &str =
    "Sorry, I couldn't search for that right now. Your current results are unchanged.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// What the caller shows after asking the assistant
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantOutcome {
    pub reply: String,
    /// Whether the reply's listings replaced the result list
    pub applied: bool,
    pub listings: usize,
    pub error: Option<OverrideChannelError>,
}

/// Chat session whose replies can override the result list
pub struct AssistantChannel<C: ?Sized> {
    chat: Arc<C>,
    session_id: String,
    transcript: Vec<ChatTurn>,
}

impl<C: ChatSource + ?Sized> AssistantChannel<C> {
    pub fn new(chat: Arc<C>) -> Self {
        Self::with_session_id(chat, Uuid::new_v4().to_string())
    }

    pub fn with_session_id(chat: Arc<C>, session_id: impl Into<String>) -> Self {
        Self {
            chat,
            session_id: session_id.into(),
            transcript: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Send `message`; a reply carrying listings replaces the controller's results.
    ///
    /// Failures never touch the result list. They come back as a chat reply
    /// with `error` set.
    pub async fn ask<S>(&mut self, message: &str, results: &SearchController<S>) -> AssistantOutcome
    where
        S: ListingSource + ?Sized,
    {
        self.push(ChatRole::User, message);
        let request = ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone(),
        };

        let outcome = match self.chat.send(&request).await {
            Ok(reply) => {
                let listings = reply.properties.len();
                let applied = listings > 0;
                if applied {
                    results.apply_override(reply.properties).await;
                    info!("Assistant supplied {} listings", listings);
                }
                AssistantOutcome {
                    reply: reply.reply,
                    applied,
                    listings,
                    error: None,
                }
            }
            Err(err) => {
                warn!("Assistant search failed: {}", err);
                AssistantOutcome {
                    reply: FAILURE_REPLY.to_string(),
                    applied: false,
                    listings: 0,
                    error: Some(err),
                }
            }
        };

        self.push(ChatRole::Assistant, &outcome.reply);
        outcome
    }

    fn push(&mut self, role: ChatRole, text: &str) {
        self.transcript.push(ChatTurn {
            role,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterUpdate;
    use crate::models::{ChatReply, Property};
    use crate::session::{ResultOrigin, SearchSession};
    use crate::testing::{page, ScriptedChat, ScriptedSource};

    async fn loaded_controller(source: &Arc<ScriptedSource>) -> SearchController<ScriptedSource> {
        source.respond(None, 0, Ok(page(&["a", "b"], 30)));
        let controller = SearchController::new(SearchSession::default(), Arc::clone(source));
        controller.start().await;
        controller
    }

    fn ids(items: &[Property]) -> Vec<&str> {
        items.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn reply_with_listings_overrides_results() {
        let source = Arc::new(ScriptedSource::new());
        let controller = loaded_controller(&source).await;
        let chat = Arc::new(ScriptedChat::new());
        chat.reply(Ok(ChatReply {
            reply: "Here are 2 villas".to_string(),
            properties: vec![Property::new("v1", "Villa 1"), Property::new("v2", "Villa 2")],
        }));
        let mut channel = AssistantChannel::with_session_id(Arc::clone(&chat), "session-9");

        let outcome = channel.ask("villas under 2 Cr", &controller).await;
        assert!(outcome.applied);
        assert_eq!(outcome.listings, 2);

        let view = controller.view().await;
        assert_eq!(ids(&view.items), ["v1", "v2"]);
        assert_eq!(view.origin, ResultOrigin::Assistant);
        assert!(!view.has_next_page);
        assert!(controller.filters().await.is_default());

        let sent = chat.requests();
        assert_eq!(sent[0].session_id, "session-9");
        assert_eq!(channel.transcript().len(), 2);
        assert_eq!(channel.transcript()[1].text, "Here are 2 villas");
    }

    #[tokio::test]
    async fn failure_leaves_results_untouched() {
        let source = Arc::new(ScriptedSource::new());
        let controller = loaded_controller(&source).await;
        let chat = Arc::new(ScriptedChat::new());
        chat.reply(Err(OverrideChannelError::Status {
            status: 502,
            body: "upstream".to_string(),
        }));
        let mut channel = AssistantChannel::new(chat);

        let outcome = channel.ask("anything", &controller).await;
        assert!(!outcome.applied);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.reply, FAILURE_REPLY);

        let view = controller.view().await;
        assert_eq!(ids(&view.items), ["a", "b"]);
        assert_eq!(view.origin, ResultOrigin::Filters);
        assert!(view.has_next_page);
    }

    #[tokio::test]
    async fn reply_without_listings_is_only_text() {
        let source = Arc::new(ScriptedSource::new());
        let controller = loaded_controller(&source).await;
        let chat = Arc::new(ScriptedChat::new());
        chat.reply(Ok(ChatReply {
            reply: "Could you tell me your budget?".to_string(),
            properties: Vec::new(),
        }));
        let mut channel = AssistantChannel::new(chat);

        let outcome = channel.ask("show me homes", &controller).await;
        assert!(!outcome.applied);
        assert_eq!(ids(&controller.view().await.items), ["a", "b"]);
    }

    #[tokio::test]
    async fn filter_change_discards_assistant_results() {
        let source = Arc::new(ScriptedSource::new());
        let controller = loaded_controller(&source).await;
        let chat = Arc::new(ScriptedChat::new());
        chat.reply(Ok(ChatReply {
            reply: "One match".to_string(),
            properties: vec![Property::new("ai-1", "Match")],
        }));
        let mut channel = AssistantChannel::new(chat);
        channel.ask("penthouse in Bopal", &controller).await;

        source.respond(None, 0, Ok(page(&["villa-1"], 12)));
        let toggle = FilterUpdate::toggle_property_type(&*controller.filters().await, "Villa");
        controller.update_filters(toggle).await;

        let view = controller.view().await;
        assert_eq!(ids(&view.items), ["villa-1"]);
        assert_eq!(view.origin, ResultOrigin::Filters);
        assert!(view.has_next_page);
    }
}
