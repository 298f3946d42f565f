use crate::Store;
use anyhow::{Context, Result};
use bulkline_types::models::{
    Contact, DeliveryStatus, HistoryEntry, Order, OrderStatus, ScheduledMessage,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("bad timestamp in store: {}", raw))
}

impl Store {
    // -- Contacts (read-only cache of the remote roster) --

    /// Replace the cached roster wholesale with the latest remote snapshot.
    pub fn replace_contacts(&self, contacts: &[Contact]) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM contacts", [])?;
            let mut stmt = conn.prepare(
                "INSERT INTO contacts (id, name, phone, tags, added_date) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for c in contacts {
                stmt.execute(rusqlite::params![
                    c.id,
                    c.name,
                    c.phone,
                    serde_json::to_string(&c.tags)?,
                    c.added_date.to_rfc3339(),
                ])?;
            }
            Ok(())
        })
    }

    pub fn insert_contact(&self, contact: &Contact) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO contacts (id, name, phone, tags, added_date) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    contact.id,
                    contact.name,
                    contact.phone,
                    serde_json::to_string(&contact.tags)?,
                    contact.added_date.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        self.with_conn(query_contacts)
    }

    pub fn delete_contact(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM contacts WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Orders --

    pub fn insert_order(&self, order: &Order) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO orders (id, customer_id, customer_name, customer_phone, items, total, status, order_date, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    order.id,
                    order.customer_id,
                    order.customer_name,
                    order.customer_phone,
                    serde_json::to_string(&order.items)?,
                    order.total,
                    order.status.as_str(),
                    order.order_date.to_rfc3339(),
                    order.notes,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_orders(&self) -> Result<Vec<Order>> {
        self.with_conn(query_orders)
    }

    pub fn set_order_status(&self, id: &str, status: OrderStatus) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                rusqlite::params![status.as_str(), id],
            )?;
            Ok(())
        })
    }

    pub fn delete_order(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM orders WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Message history (append-only) --

    pub fn insert_history(&self, entry: &HistoryEntry) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message_history (id, contact_id, contact_name, contact_phone, message, status, sent_at, scheduled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    entry.id,
                    entry.contact_id,
                    entry.contact_name,
                    entry.contact_phone,
                    entry.message,
                    entry.status.as_str(),
                    entry.sent_at.to_rfc3339(),
                    entry.scheduled as i64,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        self.with_conn(query_history)
    }

    // -- Scheduled messages --

    pub fn insert_scheduled(&self, msg: &ScheduledMessage) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO scheduled_messages (id, message, contacts, scheduled_for, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    msg.id,
                    msg.message,
                    serde_json::to_string(&msg.contacts)?,
                    msg.scheduled_for.to_rfc3339(),
                    msg.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_scheduled(&self) -> Result<Vec<ScheduledMessage>> {
        self.with_conn(query_scheduled)
    }

    pub fn delete_scheduled(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM scheduled_messages WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

fn query_contacts(conn: &Connection) -> Result<Vec<Contact>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, tags, added_date FROM contacts ORDER BY added_date DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, name, phone, tags, added_date) = row?;
        out.push(Contact {
            id,
            name,
            phone,
            tags: serde_json::from_str(&tags)?,
            added_date: parse_ts(&added_date)?,
        });
    }
    Ok(out)
}

fn query_orders(conn: &Connection) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, customer_name, customer_phone, items, total, status, order_date, notes
         FROM orders ORDER BY order_date DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, Option<String>>(8)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, customer_id, customer_name, customer_phone, items, total, status, order_date, notes) =
            row?;
        out.push(Order {
            id,
            customer_id,
            customer_name,
            customer_phone,
            items: serde_json::from_str(&items)?,
            total,
            status: OrderStatus::parse(&status)
                .with_context(|| format!("bad order status in store: {}", status))?,
            order_date: parse_ts(&order_date)?,
            notes,
        });
    }
    Ok(out)
}

fn query_history(conn: &Connection) -> Result<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, contact_id, contact_name, contact_phone, message, status, sent_at, scheduled
         FROM message_history ORDER BY sent_at DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, i64>(7)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, contact_id, contact_name, contact_phone, message, status, sent_at, scheduled) =
            row?;
        out.push(HistoryEntry {
            id,
            contact_id,
            contact_name,
            contact_phone,
            message,
            status: DeliveryStatus::parse(&status)
                .with_context(|| format!("bad delivery status in store: {}", status))?,
            sent_at: parse_ts(&sent_at)?,
            scheduled: scheduled != 0,
        });
    }
    Ok(out)
}

fn query_scheduled(conn: &Connection) -> Result<Vec<ScheduledMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, message, contacts, scheduled_for, created_at
         FROM scheduled_messages ORDER BY scheduled_for ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, message, contacts, scheduled_for, created_at) = row?;
        out.push(ScheduledMessage {
            id,
            message,
            contacts: serde_json::from_str(&contacts)?,
            scheduled_for: parse_ts(&scheduled_for)?,
            created_at: parse_ts(&created_at)?,
        });
    }
    Ok(out)
}
