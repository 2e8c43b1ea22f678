//! One-shot request against the configured dataset endpoint.

use data_collect_collector::Record;
use data_collect_collector::fetch;
use data_collect_config::CollectorConfig;

use crate::DemoError;

/// What a probe saw.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub url: String,
    pub count: usize,
    pub first: Option<Record>,
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of records received: {}", self.count)?;
        if let Some(first) = &self.first {
            write!(f, "First record: {}", serde_json::Value::Object(first.clone()))?;
        }
        Ok(())
    }
}

/// Requests the endpoint once with the configured `year` and `state`.
///
/// # Errors
///
/// Returns [`DemoError::Fetch`] if the request fails or the body is not an
/// array of records.
pub async fn probe(config: &CollectorConfig) -> Result<ProbeResult, DemoError> {
    let client = fetch::build_client(config.timeout_secs)?;
    let url = fetch::build_request_url(config)?;
    let outcome = fetch::fetch_records(&client, &url, config.data_path.as_deref()).await?;

    Ok(ProbeResult {
        url: url.to_string(),
        count: outcome.records.len(),
        first: outcome.records.into_iter().next(),
    })
}
