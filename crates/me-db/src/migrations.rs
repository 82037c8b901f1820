use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS servers (
            server_id   INTEGER PRIMARY KEY,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS users (
            user_id     INTEGER PRIMARY KEY,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per displayed message; rows sharing first_message_id form a group
        CREATE TABLE IF NOT EXISTS view_messages (
            message_id          INTEGER PRIMARY KEY,
            first_message_id    INTEGER NOT NULL,
            type_id             INTEGER NOT NULL,
            channel_id          INTEGER NOT NULL,
            user_id             INTEGER NOT NULL,
            server_id           INTEGER NOT NULL,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_view_messages_type
            ON view_messages(type_id, first_message_id);

        CREATE INDEX IF NOT EXISTS idx_view_messages_channel
            ON view_messages(type_id, channel_id);

        CREATE TABLE IF NOT EXISTS role_categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id   INTEGER NOT NULL,
            name        TEXT NOT NULL,
            emoji       TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(server_id, name)
        );

        CREATE TABLE IF NOT EXISTS linked_roles (
            server_id           INTEGER NOT NULL,
            role_id             INTEGER NOT NULL,
            short_description   TEXT NOT NULL,
            long_description    TEXT,
            emoji               TEXT NOT NULL,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (server_id, role_id)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
