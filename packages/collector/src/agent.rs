//! The data collection agent.
//!
//! [`DataCollectionAgent`] owns everything one run mutates: the record
//! store, request counters, the delay controller, and the last rate-limit
//! hint. All of it lives on a single task; methods are awaited in order.

use std::sync::Arc;
use std::time::Duration;

use data_collect_collector_models::{
    Adjustment, CollectionStats, Metadata, QualityMetrics, QualityReport, Record,
};
use data_collect_config::CollectorConfig;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

use crate::fetch::{self, FetchError, RateLimitHint};
use crate::progress::ProgressCallback;
use crate::strategy::{self, DelayController};
use crate::{RunLog, filter, quality, report};

/// Version recorded in metadata documents.
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What a finished [`DataCollectionAgent::run`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub stats: CollectionStats,
    pub metrics: QualityMetrics,
    pub delay_multiplier: f64,
}

/// Collects one dataset slice per round and reports on it.
#[derive(Debug)]
pub struct DataCollectionAgent {
    config: CollectorConfig,
    log: RunLog,
    client: reqwest::Client,
    records: Vec<Record>,
    stats: CollectionStats,
    delay: DelayController,
    rate_limit: Option<RateLimitHint>,
    rng: StdRng,
}

impl DataCollectionAgent {
    /// Creates an agent for `config`, logging through `log`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: CollectorConfig, log: RunLog) -> Result<Self, FetchError> {
        let client = fetch::build_client(config.timeout_secs)?;
        let delay = DelayController::from_config(&config);
        log.info("Agent initialized");

        Ok(Self {
            config,
            log,
            client,
            records: Vec::new(),
            stats: CollectionStats::default(),
            delay,
            rate_limit: None,
            rng: StdRng::from_entropy(),
        })
    }

    /// Replaces the jitter source, e.g. with a seeded generator.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CollectorConfig {
        &self.config
    }

    #[must_use]
    pub const fn run_log(&self) -> &RunLog {
        &self.log
    }

    /// Records currently held, already filtered to the configured columns.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub const fn stats(&self) -> CollectionStats {
        self.stats
    }

    #[must_use]
    pub const fn delay_multiplier(&self) -> f64 {
        self.delay.multiplier()
    }

    /// Successful over total requests; `1.0` before the first request.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        self.stats.success_rate()
    }

    /// Issues one request to the configured endpoint.
    ///
    /// Returns `None` on any failure. Failures are counted and logged,
    /// never raised, and never retried here. The rate-limit hint is taken
    /// from whatever response came back, error statuses included, and
    /// cleared when none did.
    pub async fn make_api_request(&mut self) -> Option<Vec<Record>> {
        self.stats.record_attempt();

        let result = match fetch::build_request_url(&self.config) {
            Ok(url) => fetch::fetch_records(&self.client, &url, self.config.data_path.as_deref())
                .await
                .map(|outcome| (url, outcome)),
            Err(e) => Err(e),
        };

        match result {
            Ok((url, outcome)) => {
                self.stats.record_success();
                self.rate_limit = Some(outcome.rate_limit);
                self.log
                    .info(format!("Data successfully fetched from {url}"));
                Some(outcome.records)
            }
            Err(e) => {
                self.stats.record_failure();
                self.rate_limit = e.rate_limit();
                self.log.error(format!("Request failed: {e}"));
                None
            }
        }
    }

    /// Fetches one batch, filters it to the configured columns, stores it,
    /// and writes the records file.
    ///
    /// When the request fails or returns no records, a warning is logged,
    /// the store keeps what an earlier round collected, and no records file
    /// is written. Returns the number of records now held.
    pub async fn collect_data(&mut self) -> usize {
        let data = self.make_api_request().await;
        self.check_rate_limits();

        match data {
            Some(records) if !records.is_empty() => {
                self.records = filter::filter_records(records, &self.config.columns);
                self.log.info(format!(
                    "Collected {} records for {} in {}",
                    self.records.len(),
                    self.config.state_label(),
                    self.config.year_label()
                ));
                self.log.info("Columns filtered");
                self.save_records();
            }
            _ => self.log.warn("No data collected from API."),
        }

        self.records.len()
    }

    fn save_records(&self) {
        let path = report::output_path(&self.config, &report::records_file_name(&self.config));
        match report::write_json(&path, &self.records) {
            Ok(()) => self.log.info(format!("Data saved to {}", path.display())),
            Err(e) => self.log.error(format!("Failed to save data: {e}")),
        }
    }

    /// Scores the records currently held.
    pub fn assess_data_quality(&self) -> QualityMetrics {
        if self.records.is_empty() {
            self.log.warn("No data available to assess quality.");
        }

        let metrics = quality::assess(&self.records, &self.config);
        let consistency = metrics
            .consistency
            .map_or_else(|| "skipped".to_string(), |score| format!("{score:.2}"));
        self.log.info(format!(
            "Data quality assessed: completeness={:.2}, accuracy={:.2}, consistency={consistency}, \
             timeliness={:.2}, overall score = {:.2}",
            metrics.completeness, metrics.accuracy, metrics.timeliness, metrics.overall
        ));
        metrics
    }

    /// Adapts the delay multiplier to the running success rate.
    pub fn adjust_strategy(&mut self) -> Adjustment {
        let adjustment = self.delay.adjust(self.success_rate());
        self.log.info(format!(
            "Adaptive strategy applied ({adjustment}). Delay multiplier is now {:.2}",
            self.delay.multiplier()
        ));
        adjustment
    }

    /// Sleeps for `base_delay * multiplier * jitter` and returns how long.
    pub async fn respectful_delay(&mut self) -> Duration {
        let jitter = strategy::jitter_factor(&mut self.rng);
        let delay = strategy::compute_delay(self.config.base_delay, self.delay.multiplier(), jitter);
        strategy::pause(delay).await;
        self.log.info(format!(
            "Respectful delay applied: {:.2} seconds",
            delay.as_secs_f64()
        ));
        delay
    }

    /// Reports the rate-limit headers of the last response, if any.
    ///
    /// Advisory only: an exhausted limit is logged as a warning and the
    /// adaptive strategy is left to react to actual failures.
    pub fn check_rate_limits(&self) -> Option<RateLimitHint> {
        let hint = self.rate_limit?;
        if hint.is_exhausted() {
            self.log.warn(format!(
                "Upstream rate limit reached (remaining: {:?}, retry after: {:?}s)",
                hint.remaining, hint.retry_after_secs
            ));
        } else if hint.is_reported() {
            log::debug!(
                target: self.log.target(),
                "Rate limit remaining: {:?} of {:?}",
                hint.remaining,
                hint.limit
            );
        }
        Some(hint)
    }

    /// Builds and writes the metadata document.
    pub fn generate_metadata(&self) -> Metadata {
        let metrics = self.assess_data_quality();
        let metadata = report::build_metadata(
            &self.records,
            &self.config,
            metrics,
            self.log.history(),
        );

        let path = report::output_path(&self.config, &report::metadata_file_name(&self.config));
        match report::write_json(&path, &metadata) {
            Ok(()) => self.log.info(format!("Metadata saved to {}", path.display())),
            Err(e) => self.log.error(format!("Failed to save metadata: {e}")),
        }
        metadata
    }

    /// Builds the quality report and writes its HTML and text renderings.
    pub fn generate_quality_report(&self) -> QualityReport {
        let report = quality::build_report(&self.records, &self.config, &self.stats);

        let html_path = report::output_path(&self.config, report::HTML_REPORT_FILE);
        match report::render_html(&report, &self.config)
            .and_then(|html| report::write_text(&html_path, &html))
        {
            Ok(()) => self
                .log
                .info(format!("Quality report saved to {}", html_path.display())),
            Err(e) => self
                .log
                .error(format!("Failed to save quality report HTML: {e}")),
        }

        let text_path =
            report::output_path(&self.config, &report::text_report_file_name(&self.config));
        match report::render_text(&report).and_then(|text| report::write_text(&text_path, &text)) {
            Ok(()) => self.log.info(format!(
                "Human-readable report saved to {}",
                text_path.display()
            )),
            Err(e) => self
                .log
                .error(format!("Failed to save human-readable report: {e}")),
        }

        report
    }

    /// Runs `rounds` collection rounds, then writes metadata and reports.
    ///
    /// Rounds after the first are preceded by a strategy adjustment and a
    /// respectful delay. Each round that returns records replaces the
    /// record store.
    pub async fn run(&mut self, rounds: u32, progress: &Arc<dyn ProgressCallback>) -> RunSummary {
        let rounds = rounds.max(1);
        progress.set_total(u64::from(rounds));

        for round in 0..rounds {
            if round > 0 {
                self.adjust_strategy();
                self.respectful_delay().await;
            }
            progress.set_message(format!("Round {}/{rounds}", round + 1));
            let collected = self.collect_data().await;
            log::debug!(target: self.log.target(), "Round {} collected {collected} records", round + 1);
            progress.inc(1);
        }

        self.generate_metadata();
        let report = self.generate_quality_report();
        let metrics = quality::assess(&self.records, &self.config);

        progress.finish(format!(
            "{} records, quality {:.2}",
            report.summary.total_records, metrics.overall
        ));

        RunSummary {
            records: self.records.len(),
            stats: self.stats,
            metrics,
            delay_multiplier: self.delay.multiplier(),
        }
    }
}
