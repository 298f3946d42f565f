use std::sync::Arc;

use anyhow::Result;
use bulkline_client::ApiClient;
use bulkline_db::Store;
use bulkline_types::api::CreateCustomerRequest;
use bulkline_types::models::Contact;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

/// Contact roster, remote-first with the local store as fallback and cache.
///
/// The client is injected at construction; `None` means the panel runs
/// local-only (missing credentials). Remote fetch failures degrade to the
/// cached roster instead of erroring the caller.
pub struct ContactsService {
    api: Option<ApiClient>,
    store: Arc<Store>,
}

impl ContactsService {
    pub fn new(api: Option<ApiClient>, store: Arc<Store>) -> Self {
        Self { api, store }
    }

    pub fn remote_enabled(&self) -> bool {
        self.api.is_some()
    }

    /// The current roster. On a successful remote fetch the local cache is
    /// replaced so later offline runs see the same contacts.
    pub async fn list(&self) -> Result<Vec<Contact>> {
        let Some(api) = &self.api else {
            return self.store.list_contacts();
        };

        match api.get_all_customers().await {
            Ok(contacts) => {
                if let Err(e) = self.store.replace_contacts(&contacts) {
                    warn!("roster cache update failed: {:#}", e);
                }
                Ok(contacts)
            }
            Err(e) => {
                warn!("roster fetch failed, using cached contacts: {}", e);
                self.store.list_contacts()
            }
        }
    }

    /// Create a contact remotely when possible, mirroring it into the local
    /// store either way. Local-only mode assigns a generated id.
    pub async fn add(&self, name: &str, phone: &str, tags: Vec<String>) -> Result<Contact> {
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            tags,
            added_date: Utc::now(),
        };

        if let Some(api) = &self.api {
            api.create_customer(&CreateCustomerRequest {
                phone: contact.phone.clone(),
                name: contact.name.clone(),
                tags: contact.tags.clone(),
                added_date: contact.added_date,
            })
            .await?;
        }

        self.store.insert_contact(&contact)?;
        Ok(contact)
    }

    /// Remove a contact from the local cache. The remote collection owns
    /// deletion through its own screens; here we only drop the cached view.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_contact(id)
    }
}
