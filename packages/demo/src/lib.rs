#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Companion tools that share the collector's HTTP stack.
//!
//! * [`probe`]: one GET of the configured dataset endpoint.
//! * [`cat_facts`]: a handful of random facts from `catfact.ninja`.
//! * [`holidays`]: public holidays per country from `date.nager.at`.

pub mod cat_facts;
pub mod holidays;
pub mod probe;

/// Errors that can occur in the companion tools.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Transport failure (connect, timeout, body read or decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Fetching from the dataset endpoint failed.
    #[error(transparent)]
    Fetch(#[from] data_collect_collector::fetch::FetchError),

    /// Writing an output file failed.
    #[error(transparent)]
    Report(#[from] data_collect_collector::report::ReportError),
}

/// Sends a GET and fails on non-2xx statuses.
async fn get_ok(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, DemoError> {
    log::debug!("GET {url}");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DemoError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response)
}
