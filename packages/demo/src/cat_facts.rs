//! Random cat facts from `catfact.ninja`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use data_collect_collector::progress::ProgressCallback;
use data_collect_collector::report;
use serde::Deserialize;

use crate::{DemoError, get_ok};

pub const CAT_FACT_URL: &str = "https://catfact.ninja/fact";

/// Per-request timeout for the facts API, in seconds.
pub const CAT_FACT_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_FACT_COUNT: usize = 5;

pub const CAT_FACTS_FILE: &str = "cat_facts.json";

#[derive(Debug, Deserialize)]
struct CatFactResponse {
    fact: String,
}

/// Builds a client with the facts API timeout.
///
/// # Errors
///
/// Returns [`DemoError::Http`] if the client cannot be constructed.
pub fn build_client() -> Result<reqwest::Client, DemoError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(CAT_FACT_TIMEOUT_SECS))
        .build()?)
}

/// Fetches a single fact.
///
/// # Errors
///
/// Returns [`DemoError`] on transport failure, a non-2xx status, or a body
/// without a `fact` field.
pub async fn get_cat_fact(client: &reqwest::Client, url: &str) -> Result<String, DemoError> {
    let body: CatFactResponse = get_ok(client, url).await?.json().await?;
    log::info!("Successfully retrieved a cat fact.");
    Ok(body.fact)
}

/// Fetches up to `count` facts, skipping failed attempts with a warning.
pub async fn collect_cat_facts(
    client: &reqwest::Client,
    url: &str,
    count: usize,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<String> {
    progress.set_total(count as u64);

    let mut facts = Vec::with_capacity(count);
    for attempt in 1..=count {
        match get_cat_fact(client, url).await {
            Ok(fact) => facts.push(fact),
            Err(e) => log::warn!("Failed to get a fact #{attempt}: {e}"),
        }
        progress.inc(1);
    }

    progress.finish(format!("{}/{count} facts", facts.len()));
    facts
}

/// Writes the facts as a pretty-printed JSON array of strings.
///
/// # Errors
///
/// Returns [`DemoError::Report`] if the file cannot be written.
pub fn save_cat_facts(path: &Path, facts: &[String]) -> Result<(), DemoError> {
    report::write_json(path, facts)?;
    log::info!("Saved cat facts to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use data_collect_collector::progress::null_progress;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn reads_fact_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"fact": "Cats sleep a lot.", "length": 17})),
            )
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let fact = get_cat_fact(&client, &server.uri()).await.unwrap();
        assert_eq!(fact, "Cats sleep a lot.");
    }

    #[tokio::test]
    async fn failed_attempts_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fact": "Purr."})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let facts = collect_cat_facts(&client, &server.uri(), 5, &null_progress()).await;
        assert_eq!(facts, ["Purr.", "Purr."]);
    }

    #[test]
    fn saves_array_of_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CAT_FACTS_FILE);
        save_cat_facts(&path, &["a".to_string(), "b".to_string()]).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved, json!(["a", "b"]));
    }
}
