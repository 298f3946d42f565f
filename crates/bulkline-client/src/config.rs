/// Remote credentials, read once at startup and injected into whichever
/// services need them. When they are absent the panel runs local-only:
/// services are constructed without a client rather than reaching for a
/// global that may or may not be initialized.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_base: String,
    pub api_key: String,
    pub blob_base: String,
}

impl RemoteConfig {
    /// Reads `BULKLINE_API_BASE`, `BULKLINE_API_KEY` and
    /// `BULKLINE_BLOB_BASE`. Returns `None` when base or key is missing.
    /// `BULKLINE_BLOB_BASE` defaults to `{api_base}/blob`.
    pub fn from_env() -> Option<Self> {
        let api_base = std::env::var("BULKLINE_API_BASE").ok()?;
        let api_key = std::env::var("BULKLINE_API_KEY").ok()?;
        if api_base.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        let api_base = api_base.trim_end_matches('/').to_string();
        let blob_base = std::env::var("BULKLINE_BLOB_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/blob", api_base));
        Some(Self {
            api_base,
            api_key,
            blob_base,
        })
    }
}
