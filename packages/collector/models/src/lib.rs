#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data types for the data collection pipeline.
//!
//! Upstream APIs return flat JSON objects which are held as [`Record`]s.
//! Everything derived from a run (request counters, quality scores, the
//! metadata document, and the quality report) is defined here so that the
//! collector and the CLI agree on one serialized shape.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};

/// One raw API result item: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Running request counters for a single collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Every request attempted, counted before its outcome is known.
    pub total_requests: u64,
    /// Requests that returned a 2xx status and a well-formed body.
    pub successful_requests: u64,
    /// Requests that failed for any reason.
    pub failed_requests: u64,
}

impl CollectionStats {
    /// Counts a request that is about to be sent.
    pub const fn record_attempt(&mut self) {
        self.total_requests += 1;
    }

    /// Counts a successful request.
    pub const fn record_success(&mut self) {
        self.successful_requests += 1;
    }

    /// Counts a failed request.
    pub const fn record_failure(&mut self) {
        self.failed_requests += 1;
    }

    /// Ratio of successful to total requests.
    ///
    /// Returns `1.0` when nothing has been attempted yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 1.0;
        }
        self.successful_requests as f64 / self.total_requests as f64
    }
}

/// Outcome of one adaptive-strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Adjustment {
    /// Success rate fell below the lower threshold; delays were doubled.
    Increased,
    /// Success rate exceeded the upper threshold; delays were shortened.
    Decreased,
    /// Success rate was within the neutral band.
    Unchanged,
}

/// The four quality sub-scores and their mean, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Share of records with every configured column present and non-empty.
    pub completeness: f64,
    /// Fixed placeholder score; no accuracy check exists yet.
    pub accuracy: f64,
    /// `1.0` when all records share one `year`, `0.5` when they differ.
    /// `None` when it could not be computed (no records, or a record has
    /// no `year`).
    pub consistency: Option<f64>,
    /// Share of records whose `year` matches the configured year.
    pub timeliness: f64,
    /// Mean of the computed sub-scores.
    pub overall: f64,
}

/// Run provenance written at the top of the metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// RFC 3339 timestamp of when the document was built.
    pub collection_date: String,
    /// Version of the collecting agent.
    pub agent_version: String,
    /// Who ran the collection, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector: Option<String>,
    /// Number of records held at the end of the run.
    pub total_records: usize,
}

/// The per-run metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub collection_info: CollectionInfo,
    /// Endpoints data was requested from.
    pub data_sources: Vec<String>,
    pub quality_metrics: QualityMetrics,
    /// Ordered processing steps recorded during the run.
    pub processing_history: Vec<String>,
    /// Column names the records were filtered to.
    pub variables: Vec<String>,
}

/// Headline numbers of a quality report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_records: usize,
    pub collection_success_rate: f64,
    pub overall_quality_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletenessAnalysis {
    pub completeness: f64,
}

/// Value spread of one configured column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDistribution {
    pub column: String,
    /// Distinct values among the records that carry the column.
    pub unique_values: usize,
    /// Up to five values, in record order.
    pub sample_values: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    /// Records that ended up with no fields at all.
    pub missing_records: usize,
}

/// Detailed quality assessment, rendered to HTML and plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub summary: ReportSummary,
    pub completeness_analysis: CompletenessAnalysis,
    pub data_distribution: Vec<ColumnDistribution>,
    pub anomaly_detection: AnomalySummary,
}

/// Named sections of a [`QualityReport`], in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ReportSection {
    Summary,
    CompletenessAnalysis,
    DataDistribution,
    AnomalyDetection,
}

impl ReportSection {
    /// Human-readable heading (e.g. `"Data Distribution"`).
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::CompletenessAnalysis => "Completeness Analysis",
            Self::DataDistribution => "Data Distribution",
            Self::AnomalyDetection => "Anomaly Detection",
        }
    }
}

impl QualityReport {
    /// Returns the JSON value of one section.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the section cannot be serialized.
    pub fn section_value(
        &self,
        section: ReportSection,
    ) -> Result<serde_json::Value, serde_json::Error> {
        match section {
            ReportSection::Summary => serde_json::to_value(self.summary),
            ReportSection::CompletenessAnalysis => serde_json::to_value(self.completeness_analysis),
            ReportSection::DataDistribution => serde_json::to_value(&self.data_distribution),
            ReportSection::AnomalyDetection => serde_json::to_value(self.anomaly_detection),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn success_rate_is_one_before_any_request() {
        let stats = CollectionStats::default();
        assert!((stats.success_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn success_rate_is_exact_ratio() {
        let mut stats = CollectionStats::default();
        for _ in 0..4 {
            stats.record_attempt();
        }
        stats.record_success();
        stats.record_failure();
        stats.record_failure();
        stats.record_failure();
        assert!((stats.success_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn report_sections_render_in_order() {
        let names: Vec<String> = ReportSection::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            [
                "summary",
                "completeness_analysis",
                "data_distribution",
                "anomaly_detection"
            ]
        );
    }

    #[test]
    fn skipped_consistency_serializes_as_null() {
        let metrics = QualityMetrics {
            completeness: 0.0,
            accuracy: 1.0,
            consistency: None,
            timeliness: 0.0,
            overall: 0.0,
        };
        let value = serde_json::to_value(metrics).unwrap();
        assert!(value["consistency"].is_null());
    }

    #[test]
    fn adjustment_displays_snake_case() {
        assert_eq!(Adjustment::Increased.to_string(), "increased");
        assert_eq!(Adjustment::Unchanged.as_ref(), "unchanged");
    }
}
