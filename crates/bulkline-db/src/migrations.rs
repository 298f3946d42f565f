use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS contacts (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            phone       TEXT NOT NULL,
            tags        TEXT NOT NULL DEFAULT '[]',
            added_date  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS orders (
            id              TEXT PRIMARY KEY,
            customer_id     TEXT NOT NULL,
            customer_name   TEXT NOT NULL,
            customer_phone  TEXT NOT NULL,
            items           TEXT NOT NULL DEFAULT '[]',
            total           REAL NOT NULL,
            status          TEXT NOT NULL,
            order_date      TEXT NOT NULL,
            notes           TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_orders_date
            ON orders(order_date);

        CREATE TABLE IF NOT EXISTS message_history (
            id              TEXT PRIMARY KEY,
            contact_id      TEXT NOT NULL,
            contact_name    TEXT NOT NULL,
            contact_phone   TEXT NOT NULL,
            message         TEXT NOT NULL,
            status          TEXT NOT NULL,
            sent_at         TEXT NOT NULL,
            scheduled       INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_history_sent_at
            ON message_history(sent_at);

        CREATE TABLE IF NOT EXISTS scheduled_messages (
            id              TEXT PRIMARY KEY,
            message         TEXT NOT NULL,
            contacts        TEXT NOT NULL DEFAULT '[]',
            scheduled_for   TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_scheduled_for
            ON scheduled_messages(scheduled_for);
        ",
    )?;

    info!("Store migrations complete");
    Ok(())
}
