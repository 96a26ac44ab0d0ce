use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS valentine_requests (
            id              TEXT PRIMARY KEY,
            sender_name     TEXT NOT NULL,
            recipient_name  TEXT NOT NULL,
            message         TEXT NOT NULL,
            custom_message  TEXT,
            gift            TEXT NOT NULL,
            theme           TEXT NOT NULL,
            music           TEXT NOT NULL,
            accepted        INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_requests_created
            ON valentine_requests(created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
