//! Single-request fetcher for JSON dataset endpoints.
//!
//! Builds the request URL from the configuration (`year` and `state` become
//! query parameters when set), issues one GET with a bounded timeout, and
//! extracts an array of flat JSON objects from the body. Nothing here
//! retries; the agent turns every [`FetchError`] into a logged "no data"
//! result.

use std::time::Duration;

use data_collect_config::CollectorConfig;
use reqwest::Url;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::Record;

/// Maximum length of a response body excerpt included in errors.
const BODY_PREVIEW_LEN: usize = 200;

/// Errors that can occur while fetching records.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidUrl {
        /// The endpoint as configured.
        url: String,
        /// Why it could not be parsed.
        message: String,
    },

    /// Transport failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Requested URL.
        url: String,
        /// Rate-limit headers sent with the error response.
        rate_limit: RateLimitHint,
    },

    /// The body is not JSON or not an array of objects.
    #[error("Malformed response: {message}")]
    Malformed {
        /// What was wrong with the body.
        message: String,
    },
}

/// Advisory rate-limit information read from response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHint {
    /// `X-RateLimit-Limit`.
    pub limit: Option<u64>,
    /// `X-RateLimit-Remaining`.
    pub remaining: Option<u64>,
    /// `Retry-After`, when given in seconds.
    pub retry_after_secs: Option<u64>,
}

impl FetchError {
    /// Rate-limit headers of the response behind this error, if the
    /// server answered at all.
    #[must_use]
    pub const fn rate_limit(&self) -> Option<RateLimitHint> {
        match self {
            Self::Status { rate_limit, .. } => Some(*rate_limit),
            Self::InvalidUrl { .. } | Self::Http(_) | Self::Malformed { .. } => None,
        }
    }
}

impl RateLimitHint {
    /// Reads the rate-limit headers from a response.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
        };

        Self {
            limit: number("x-ratelimit-limit"),
            remaining: number("x-ratelimit-remaining"),
            retry_after_secs: number(RETRY_AFTER.as_str()),
        }
    }

    /// Whether the server reported any rate-limit header at all.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        self.limit.is_some() || self.remaining.is_some() || self.retry_after_secs.is_some()
    }

    /// Whether the server asked us to stop for now.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.remaining, Some(0)) || self.retry_after_secs.is_some()
    }
}

/// Records and rate-limit hints from one successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub rate_limit: RateLimitHint,
}

/// Builds an HTTP client with the configured request timeout.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the client cannot be constructed.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Builds the request URL: `api_endpoint` plus `year` and `state` query
/// parameters, each omitted when not configured.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `api_endpoint` does not parse.
pub fn build_request_url(config: &CollectorConfig) -> Result<Url, FetchError> {
    let mut url = Url::parse(&config.api_endpoint).map_err(|e| FetchError::InvalidUrl {
        url: config.api_endpoint.clone(),
        message: e.to_string(),
    })?;

    let params: Vec<(&str, &str)> = [
        ("year", config.year.as_deref()),
        ("state", config.state.as_deref()),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|value| (key, value)))
    .collect();

    // `query_pairs_mut` leaves a bare `?` behind when nothing is appended.
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}

/// Issues one GET and extracts the records.
///
/// # Errors
///
/// Returns [`FetchError`] on transport failure, a non-2xx status, or a body
/// that is not an array of JSON objects (at `data_path`, when given).
pub async fn fetch_records(
    client: &reqwest::Client,
    url: &Url,
    data_path: Option<&str>,
) -> Result<FetchOutcome, FetchError> {
    log::debug!("GET {url}");

    let response = client.get(url.clone()).send().await?;
    let rate_limit = RateLimitHint::from_headers(response.headers());
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
            rate_limit,
        });
    }

    let text = response.text().await?;
    let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        FetchError::Malformed {
            message: format!("body is not JSON ({e}): {preview}"),
        }
    })?;

    let records = extract_records(body, data_path)?;
    log::debug!("{} records in response from {url}", records.len());

    Ok(FetchOutcome {
        records,
        rate_limit,
    })
}

/// Pulls the record array out of a response body.
///
/// With no `data_path` the body itself must be the array; otherwise the
/// dot-separated path is followed through nested objects first.
///
/// # Errors
///
/// Returns [`FetchError::Malformed`] if the path is missing, the value is
/// not an array, or an item is not an object.
pub fn extract_records(
    body: serde_json::Value,
    data_path: Option<&str>,
) -> Result<Vec<Record>, FetchError> {
    let mut current = body;
    if let Some(path) = data_path {
        for segment in path.split('.') {
            current = match current {
                serde_json::Value::Object(mut map) => {
                    map.remove(segment).ok_or_else(|| FetchError::Malformed {
                        message: format!("response does not contain path '{path}'"),
                    })?
                }
                _ => {
                    return Err(FetchError::Malformed {
                        message: format!("response does not contain path '{path}'"),
                    });
                }
            };
        }
    }

    let serde_json::Value::Array(items) = current else {
        return Err(FetchError::Malformed {
            message: "expected JSON array of records".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(FetchError::Malformed {
                message: format!("item {index} is not an object: {other}"),
            }),
        })
        .collect()
}
