use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use palaver_types::models::{BROADCAST, Message, MessageKind, Participant};

use crate::Database;
use crate::store::ChatStore;

const MESSAGE_COLUMNS: &str = "id, from_name, to_name, text, kind, sent_at";

impl ChatStore for Database {
    // -- Participants --

    fn insert_participant(&self, participant: &Participant) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO participants (name, last_status) VALUES (?1, ?2)",
                params![participant.name, participant.last_seen_at.timestamp_millis()],
            )?;
            Ok(inserted == 1)
        })
    }

    fn find_participant(&self, name: &str) -> Result<Option<Participant>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT name, last_status FROM participants WHERE name = ?1",
                [name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?
            .map(participant_from_parts)
            .transpose()
        })
    }

    fn list_participants(&self) -> Result<Vec<Participant>> {
        self.with_conn(|conn| {
            query_participants(conn, "SELECT name, last_status FROM participants ORDER BY name", [])
        })
    }

    fn touch_participant(&self, name: &str, seen_at: DateTime<Utc>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE participants SET last_status = ?1 WHERE name = ?2",
                params![seen_at.timestamp_millis(), name],
            )?;
            Ok(updated == 1)
        })
    }

    fn find_stale_participants(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>> {
        self.with_conn(|conn| {
            query_participants(
                conn,
                "SELECT name, last_status FROM participants WHERE last_status < ?1 ORDER BY name",
                [cutoff.timestamp_millis()],
            )
        })
    }

    fn expire_participant(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        notice: &Message,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            // Re-check staleness: a heartbeat may have landed since the scan
            let removed = tx.execute(
                "DELETE FROM participants WHERE name = ?1 AND last_status < ?2",
                params![name, cutoff.timestamp_millis()],
            )?;
            if removed == 0 {
                return Ok(false);
            }

            insert_message_row(&tx, notice)?;
            tx.commit()?;
            Ok(true)
        })
    }

    // -- Messages --

    fn insert_message(&self, message: &Message) -> Result<()> {
        self.with_conn_mut(|conn| insert_message_row(conn, message))
    }

    fn find_message(&self, id: Uuid) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1");
            conn.query_row(&sql, [id.to_string()], message_parts)
                .optional()?
                .map(message_from_parts)
                .transpose()
        })
    }

    fn list_messages_visible_to(&self, viewer: &str, limit: Option<u64>) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            // SQLite treats a negative LIMIT as unbounded
            let limit = limit.and_then(|n| i64::try_from(n).ok()).unwrap_or(-1);
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE to_name = ?1 OR to_name = ?2 OR from_name = ?2
                 ORDER BY seq DESC
                 LIMIT ?3"
            );

            let mut stmt = conn.prepare(&sql)?;
            let parts = stmt
                .query_map(params![BROADCAST, viewer, limit], message_parts)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            parts.into_iter().map(message_from_parts).collect()
        })
    }

    fn delete_message_from(&self, id: Uuid, from: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND from_name = ?2",
                params![id.to_string(), from],
            )?;
            Ok(deleted == 1)
        })
    }
}

fn insert_message_row(conn: &Connection, message: &Message) -> Result<()> {
    conn.execute(
        "INSERT INTO messages (id, from_name, to_name, text, kind, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            message.id.to_string(),
            message.from,
            message.to,
            message.text,
            message.kind.as_str(),
            message.sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ],
    )?;
    Ok(())
}

fn query_participants<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Participant>> {
    let mut stmt = conn.prepare(sql)?;
    let parts = stmt
        .query_map(params, |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    parts.into_iter().map(participant_from_parts).collect()
}

fn participant_from_parts((name, last_status): (String, i64)) -> Result<Participant> {
    let last_seen_at = DateTime::from_timestamp_millis(last_status)
        .ok_or_else(|| anyhow!("Corrupt last_status {} for participant '{}'", last_status, name))?;
    Ok(Participant { name, last_seen_at })
}

type MessageParts = (String, String, String, String, String, String);

fn message_parts(row: &Row<'_>) -> rusqlite::Result<MessageParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn message_from_parts((id, from, to, text, kind, sent_at): MessageParts) -> Result<Message> {
    let parsed_id = id
        .parse::<Uuid>()
        .map_err(|e| anyhow!("Corrupt message id '{}': {}", id, e))?;
    let kind = MessageKind::parse(&kind)
        .ok_or_else(|| anyhow!("Corrupt kind '{}' on message '{}'", kind, id))?;
    let sent_at = DateTime::parse_from_rfc3339(&sent_at)
        .map_err(|e| anyhow!("Corrupt sent_at '{}' on message '{}': {}", sent_at, id, e))?
        .with_timezone(&Utc);

    Ok(Message {
        id: parsed_id,
        from,
        to,
        text,
        kind,
        sent_at,
    })
}
