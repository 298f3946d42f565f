use bulkline_types::models::Contact;
use chrono::{DateTime, Local};

/// A canned message body with `{name}`/`{phone}`/`{date}`/`{time}` tokens.
/// The list is a process-wide constant; nothing mutates it at runtime.
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub body: &'static str,
    pub category: &'static str,
}

pub const TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "1",
        name: "Welcome Message",
        body: "Welcome to our service! We're excited to have you on board. Feel free to reach out if you have any questions.",
        category: "Welcome",
    },
    MessageTemplate {
        id: "2",
        name: "Promotional Offer",
        body: "\u{1F389} Special offer just for you! Get 20% off your next purchase. Use code SAVE20. Valid until {date}.",
        category: "Marketing",
    },
    MessageTemplate {
        id: "3",
        name: "Event Reminder",
        body: "Don't forget! Our event is happening on {date} at {time}. We look forward to seeing you there!",
        category: "Events",
    },
    MessageTemplate {
        id: "4",
        name: "Follow Up",
        body: "Hi {name}, just following up on our previous conversation. Let me know if you need any assistance!",
        category: "Follow-up",
    },
];

/// Body for a template id, or `None` when the id is unknown. The caller
/// replaces its compose buffer wholesale; there is no merging.
pub fn apply(template_id: &str) -> Option<&'static str> {
    TEMPLATES.iter().find(|t| t.id == template_id).map(|t| t.body)
}

/// Substitute the four recognized tokens with this recipient's data.
/// Every occurrence is replaced; unrecognized tokens stay verbatim. Used
/// for on-screen preview and for the history log, never for the dispatch
/// body itself.
pub fn personalize(body: &str, contact: &Contact) -> String {
    personalize_at(body, contact, Local::now())
}

pub fn personalize_at(body: &str, contact: &Contact, now: DateTime<Local>) -> String {
    // No token expands into another token, so replacement order is inert.
    body.replace("{name}", &contact.name)
        .replace("{phone}", &contact.phone)
        .replace("{date}", &now.format("%d/%m/%Y").to_string())
        .replace("{time}", &now.format("%H:%M:%S").to_string())
}
