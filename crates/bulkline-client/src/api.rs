use reqwest::Client as HttpClient;
use tracing::debug;

use bulkline_types::api::{
    BulkSendRequest, BulkSendResponse, CreateCustomerRequest, CustomerListResponse,
};
use bulkline_types::models::Contact;

use crate::config::RemoteConfig;
use crate::{ClientError, check_status};

/// Client for the remote customer/messaging API. Every call carries the
/// fixed `x-api-key` header from the injected config.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base: String,
    key: String,
}

impl ApiClient {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            http: HttpClient::new(),
            base: cfg.api_base.clone(),
            key: cfg.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// `GET /getAllCustomer` — the full contact roster, newest first.
    pub async fn get_all_customers(&self) -> Result<Vec<Contact>, ClientError> {
        let resp = self
            .http
            .get(self.url("getAllCustomer"))
            .header("x-api-key", &self.key)
            .send()
            .await?;
        let body: CustomerListResponse = check_status(resp)?.json().await?;
        debug!("fetched {} customers", body.results.len());
        Ok(body.results)
    }

    /// `POST /createCustomer`. The service assigns the id; callers refetch
    /// the roster to observe it.
    pub async fn create_customer(&self, req: &CreateCustomerRequest) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url("createCustomer"))
            .header("x-api-key", &self.key)
            .json(req)
            .send()
            .await?;
        check_status(resp)?;
        Ok(())
    }

    /// `POST /sendBulkMessage` — the single dispatch call. Fan-out to the
    /// individual recipients happens on the backend.
    pub async fn send_bulk_message(
        &self,
        req: &BulkSendRequest,
    ) -> Result<BulkSendResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("sendBulkMessage"))
            .header("x-api-key", &self.key)
            .json(req)
            .send()
            .await?;
        let ack: BulkSendResponse = check_status(resp)?.json().await?;
        Ok(ack)
    }
}
