use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tributes (
            id                TEXT PRIMARY KEY,
            name              TEXT NOT NULL,
            relationship      TEXT,
            message           TEXT NOT NULL,
            photo_url         TEXT,
            publish_approved  INTEGER NOT NULL DEFAULT 0,
            consent           INTEGER NOT NULL,
            created_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tributes_wall
            ON tributes(publish_approved, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
