use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Reserved recipient that addresses every participant.
pub const BROADCAST: &str = "Todos";

/// Status notice text emitted when a participant registers.
pub const JOINED: &str = "joined";

/// Status notice text emitted when a participant is expired.
pub const LEFT: &str = "left";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub name: String,
    /// Last registration or heartbeat, sent to clients as epoch milliseconds.
    #[serde(rename = "lastStatus", with = "chrono::serde::ts_milliseconds")]
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKind {
    #[serde(rename = "message")]
    Chat,
    #[serde(rename = "private_message")]
    Private,
    #[serde(rename = "status")]
    Status,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [Self::Chat, Self::Private, Self::Status];

    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "message",
            Self::Private => "private_message",
            Self::Status => "status",
        }
    }

    /// Accepts the wire names plus the short `chat` / `private` aliases.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "message" | "chat" => Some(Self::Chat),
            "private_message" | "private" => Some(Self::Private),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored chat message. Immutable once created; only its sender may delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(rename = "time", serialize_with = "serialize_clock_time")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Whether `viewer` may see this message when listing.
    pub fn is_visible_to(&self, viewer: &str) -> bool {
        self.to == BROADCAST || self.to == viewer || self.from == viewer
    }
}

fn serialize_clock_time<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&at.format("%H:%M:%S"))
}

/// A message that passed validation and is ready to be stamped and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
}
