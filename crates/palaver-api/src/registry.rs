use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use palaver_types::error::ChatError;
use palaver_types::models::{JOINED, LEFT, Participant};
use palaver_types::validate;

use crate::clock::Clock;
use crate::messages::{MessageStore, status_notice};
use crate::store::SharedStore;

/// Known participants: unique names and last-heartbeat times.
#[derive(Clone)]
pub struct Registry {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    messages: MessageStore,
}

impl Registry {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>, messages: MessageStore) -> Self {
        Self { store, clock, messages }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Registers `name` and announces the join to everyone.
    ///
    /// The insert is conditional at the store, so of two concurrent
    /// registrations for one name exactly one succeeds. The join notice is
    /// written separately; if that write fails the participant stays
    /// registered without a notice.
    pub async fn register(&self, name: Option<&str>) -> Result<Participant, ChatError> {
        let name = validate::participant_name(name)?.to_string();
        let participant = Participant {
            name: name.clone(),
            last_seen_at: self.clock.now(),
        };

        let record = participant.clone();
        let inserted = self
            .store
            .call(move |store| store.insert_participant(&record))
            .await?;
        if !inserted {
            return Err(ChatError::Conflict(name));
        }

        info!("Participant '{}' joined", name);
        if let Err(e) = self.messages.post_status(&name, JOINED).await {
            warn!("Join notice for '{}' was not recorded: {}", name, e);
        }

        Ok(participant)
    }

    pub async fn list(&self) -> Result<Vec<Participant>, ChatError> {
        self.store.call(|store| store.list_participants()).await
    }

    /// Refreshes `last_seen_at`. Unknown or missing names are `NotFound`;
    /// a heartbeat never creates a participant.
    pub async fn heartbeat(&self, name: Option<&str>) -> Result<(), ChatError> {
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            return Err(ChatError::NotFound("participant".into()));
        };

        let owned = name.to_string();
        let now = self.clock.now();
        let touched = self
            .store
            .call(move |store| store.touch_participant(&owned, now))
            .await?;

        if !touched {
            return Err(ChatError::NotFound(format!("participant {name:?}")));
        }
        debug!("Heartbeat from '{}'", name);
        Ok(())
    }

    /// Removes every participant silent for longer than `threshold` as of
    /// `now`, each together with its departure notice. Returns the names
    /// actually removed by this call; overlapping runs never remove a
    /// participant twice.
    pub async fn expire_stale(
        &self,
        threshold: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, ChatError> {
        let cutoff = now - threshold;

        self.store
            .call(move |store| {
                let mut expired = Vec::new();
                for participant in store.find_stale_participants(cutoff)? {
                    let notice = status_notice(&participant.name, LEFT, now);
                    if store.expire_participant(&participant.name, cutoff, &notice)? {
                        expired.push(participant.name);
                    }
                }
                Ok(expired)
            })
            .await
    }
}
