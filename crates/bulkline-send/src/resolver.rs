use bulkline_types::models::Contact;

/// Filter the roster down to the selected ids, preserving roster order.
/// Ids that no longer exist in the roster are silently excluded, so a
/// stale selection never errors. Pure; no side effects.
pub fn resolve(selected_ids: &[String], roster: &[Contact]) -> Vec<Contact> {
    roster
        .iter()
        .filter(|c| selected_ids.contains(&c.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn roster() -> Vec<Contact> {
        ["1", "2", "3"]
            .iter()
            .map(|id| Contact {
                id: id.to_string(),
                name: format!("Contact {}", id),
                phone: format!("{0}{0}{0}", id),
                tags: vec![],
                added_date: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn keeps_roster_order_regardless_of_selection_order() {
        let selected = vec!["3".to_string(), "1".to_string()];
        let out = resolve(&selected, &roster());
        let ids: Vec<_> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn stale_ids_are_silently_excluded() {
        let selected = vec!["2".to_string(), "gone".to_string()];
        let out = resolve(&selected, &roster());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].phone, "222");
    }

    #[test]
    fn result_never_exceeds_roster_size() {
        let selected: Vec<String> =
            ["1", "1", "2", "3", "4", "5"].iter().map(|s| s.to_string()).collect();
        let out = resolve(&selected, &roster());
        assert!(out.len() <= roster().len());
    }

    #[test]
    fn empty_selection_resolves_to_nothing() {
        assert!(resolve(&[], &roster()).is_empty());
    }
}
