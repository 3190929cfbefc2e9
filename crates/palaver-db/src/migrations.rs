use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (participants, messages)");
        conn.execute_batch(
            "
            CREATE TABLE participants (
                name        TEXT PRIMARY KEY,
                last_status INTEGER NOT NULL
            );

            CREATE INDEX idx_participants_last_status
                ON participants(last_status);

            -- seq fixes creation order; id is the public identifier
            CREATE TABLE messages (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                id          TEXT NOT NULL UNIQUE,
                from_name   TEXT NOT NULL,
                to_name     TEXT NOT NULL,
                text        TEXT NOT NULL,
                kind        TEXT NOT NULL,
                sent_at     TEXT NOT NULL
            );

            CREATE INDEX idx_messages_to ON messages(to_name);
            CREATE INDEX idx_messages_from ON messages(from_name);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
