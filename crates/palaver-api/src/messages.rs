use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use palaver_types::api::SendMessageRequest;
use palaver_types::error::ChatError;
use palaver_types::models::{BROADCAST, Message, MessageKind};
use palaver_types::validate;

use crate::clock::Clock;
use crate::store::SharedStore;

/// Append-only message log with visibility and ownership rules.
#[derive(Clone)]
pub struct MessageStore {
    store: SharedStore,
    clock: Arc<dyn Clock>,
}

impl MessageStore {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stores a message from `from`, which must name a registered participant.
    /// An unregistered or missing sender is `Unauthorized`.
    pub async fn send(
        &self,
        from: Option<&str>,
        req: &SendMessageRequest,
    ) -> Result<Message, ChatError> {
        let outgoing = validate::outgoing_message(req)?;
        let from = from.unwrap_or_default().to_string();

        let sender = from.clone();
        let registered = self
            .store
            .call(move |store| Ok(store.find_participant(&sender)?.is_some()))
            .await?;
        if !registered {
            return Err(ChatError::Unauthorized(from));
        }

        let message = Message {
            id: Uuid::new_v4(),
            from,
            to: outgoing.to,
            text: outgoing.text,
            kind: outgoing.kind,
            sent_at: self.clock.now(),
        };

        let record = message.clone();
        self.store.call(move |store| store.insert_message(&record)).await?;

        debug!("Message {} from '{}' to '{}'", message.id, message.from, message.to);
        Ok(message)
    }

    /// Messages visible to `viewer`, newest first. `raw_limit` must be a
    /// positive integer when present.
    pub async fn list(
        &self,
        viewer: Option<&str>,
        raw_limit: Option<&str>,
    ) -> Result<Vec<Message>, ChatError> {
        let limit = validate::limit(raw_limit)?;
        let viewer = match viewer {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => return Err(ChatError::invalid("a viewer name is required")),
        };

        self.store
            .call(move |store| store.list_messages_visible_to(&viewer, limit))
            .await
    }

    /// Deletes a message on behalf of `requester`, who must be its sender.
    pub async fn delete(&self, id: &str, requester: Option<&str>) -> Result<(), ChatError> {
        let not_found = || ChatError::NotFound(format!("message {id:?}"));
        // A malformed id can never match a stored message
        let message_id: Uuid = id.parse().map_err(|_| not_found())?;

        let message = self
            .store
            .call(move |store| store.find_message(message_id))
            .await?
            .ok_or_else(not_found)?;

        if requester != Some(message.from.as_str()) {
            return Err(ChatError::Forbidden);
        }

        let deleted = self
            .store
            .call(move |store| store.delete_message_from(message_id, &message.from))
            .await?;
        if !deleted {
            // Lost a race with another delete of the same message
            return Err(not_found());
        }

        info!("Message {} deleted by its sender", message_id);
        Ok(())
    }

    /// Appends a system `status` notice from `name` to everyone.
    pub async fn post_status(&self, name: &str, text: &str) -> Result<Message, ChatError> {
        let notice = status_notice(name, text, self.clock.now());
        let record = notice.clone();
        self.store.call(move |store| store.insert_message(&record)).await?;
        Ok(notice)
    }
}

pub(crate) fn status_notice(name: &str, text: &str, at: DateTime<Utc>) -> Message {
    Message {
        id: Uuid::new_v4(),
        from: name.to_string(),
        to: BROADCAST.to_string(),
        text: text.to_string(),
        kind: MessageKind::Status,
        sent_at: at,
    }
}
