use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use palaver_types::models::{Message, Participant};

/// Persistent collections shared by request handlers and the presence sweeper.
///
/// Implementations must make each method atomic on its own; callers rely on
/// the conditional writes (`insert_participant`, `expire_participant`,
/// `delete_message_from`) to settle races between concurrent requests.
pub trait ChatStore: Send + Sync {
    // -- Participants --

    /// Inserts the participant unless the name is taken. Returns `false` when
    /// a participant with that name already exists.
    fn insert_participant(&self, participant: &Participant) -> Result<bool>;

    fn find_participant(&self, name: &str) -> Result<Option<Participant>>;

    fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Sets `last_seen_at`. Returns `false` if no such participant exists.
    fn touch_participant(&self, name: &str, seen_at: DateTime<Utc>) -> Result<bool>;

    /// Participants last seen strictly before `cutoff`.
    fn find_stale_participants(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>>;

    /// Removes the participant if it is still last seen before `cutoff`, and
    /// appends `notice` in the same transaction. Returns whether it was removed.
    fn expire_participant(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        notice: &Message,
    ) -> Result<bool>;

    // -- Messages --

    fn insert_message(&self, message: &Message) -> Result<()>;

    fn find_message(&self, id: Uuid) -> Result<Option<Message>>;

    /// Messages addressed to everyone, to `viewer`, or sent by `viewer`,
    /// newest first. `None` means no limit.
    fn list_messages_visible_to(&self, viewer: &str, limit: Option<u64>) -> Result<Vec<Message>>;

    /// Deletes the message only if it still exists with sender `from`.
    fn delete_message_from(&self, id: Uuid, from: &str) -> Result<bool>;
}
