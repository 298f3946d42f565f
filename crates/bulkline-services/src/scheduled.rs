use std::sync::Arc;

use anyhow::Result;
use bulkline_db::Store;
use bulkline_types::models::ScheduledMessage;
use chrono::{DateTime, Utc};

/// Parked messages awaiting their scheduled time. Nothing here dispatches;
/// a future worker (or the operator) picks due entries up.
pub struct ScheduledService {
    store: Arc<Store>,
}

impl ScheduledService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn add(&self, msg: &ScheduledMessage) -> Result<()> {
        self.store.insert_scheduled(msg)
    }

    /// All parked messages, soonest first.
    pub fn list(&self) -> Result<Vec<ScheduledMessage>> {
        self.store.list_scheduled()
    }

    /// Parked messages whose time has passed.
    pub fn due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledMessage>> {
        let mut all = self.store.list_scheduled()?;
        all.retain(|m| m.scheduled_for <= now);
        Ok(all)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        self.store.delete_scheduled(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkline_types::models::Contact;
    use chrono::TimeZone;

    fn msg(id: &str, hour: u32) -> ScheduledMessage {
        ScheduledMessage {
            id: id.into(),
            message: "Reminder".into(),
            contacts: vec![Contact {
                id: "1".into(),
                name: "Asha".into(),
                phone: "111".into(),
                tags: vec![],
                added_date: Utc::now(),
            }],
            scheduled_for: Utc.with_ymd_and_hms(2026, 9, 1, hour, 0, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn due_filters_by_time() {
        let svc = ScheduledService::new(Arc::new(Store::open_in_memory().unwrap()));
        svc.add(&msg("early", 8)).unwrap();
        svc.add(&msg("late", 18)).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let due = svc.due(now).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "early");

        svc.remove("early").unwrap();
        assert_eq!(svc.list().unwrap().len(), 1);
    }
}
