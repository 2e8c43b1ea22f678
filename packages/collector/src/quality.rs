//! Data quality scoring.
//!
//! Every function here is a pure function of the record set (plus the
//! configuration where needed) and never fails: an empty record set scores
//! 0 for completeness, timeliness, and the overall score. A score of 0
//! therefore does not mean "not computed".

use std::collections::BTreeSet;

use data_collect_collector_models::{
    AnomalySummary, CollectionStats, ColumnDistribution, CompletenessAnalysis, QualityMetrics,
    QualityReport, Record, ReportSummary,
};
use data_collect_config::CollectorConfig;

/// Field compared by the consistency and timeliness checks.
pub const YEAR_FIELD: &str = "year";

/// Number of sample values listed per column in a distribution.
const SAMPLE_SIZE: usize = 5;

/// Score when every record shares one year.
const CONSISTENT: f64 = 1.0;

/// Score when records carry differing years.
const INCONSISTENT: f64 = 0.5;

/// Renders a JSON value as text for comparisons.
///
/// Strings render without quotes and numbers/booleans as their JSON text,
/// so `"2023"` and `2023` compare equal. `null` has no text.
#[must_use]
pub fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Whether a value counts as empty: `null`, `""`, `[]`, or `{}`.
#[must_use]
pub fn is_empty_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => false,
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}

/// Share of records in which every column in `columns` is present and
/// non-empty. `0.0` for an empty record set.
#[must_use]
pub fn check_completeness(records: &[Record], columns: &[String]) -> f64 {
    let complete = records
        .iter()
        .filter(|record| {
            columns
                .iter()
                .all(|column| record.get(column).is_some_and(|v| !is_empty_value(v)))
        })
        .count();
    ratio(complete, records.len())
}

/// Accuracy is not checked yet; every record set is assumed accurate.
#[must_use]
pub const fn check_accuracy(_records: &[Record]) -> f64 {
    1.0
}

/// `1.0` when every record has the same `year`, `0.5` when they differ.
///
/// Returns `None` when the check cannot run: the record set is empty or a
/// record has no usable `year`.
#[must_use]
pub fn check_consistency(records: &[Record]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }

    let years = records
        .iter()
        .map(|record| record.get(YEAR_FIELD).and_then(value_text))
        .collect::<Option<BTreeSet<String>>>()?;

    Some(if years.len() == 1 {
        CONSISTENT
    } else {
        INCONSISTENT
    })
}

/// Share of records whose `year`, compared as text, equals `year`.
/// `0.0` for an empty record set or when no year is configured.
#[must_use]
pub fn check_timeliness(records: &[Record], year: Option<&str>) -> f64 {
    let Some(year) = year else {
        return 0.0;
    };
    let timely = records
        .iter()
        .filter(|record| {
            record
                .get(YEAR_FIELD)
                .and_then(value_text)
                .is_some_and(|text| text == year)
        })
        .count();
    ratio(timely, records.len())
}

/// Computes all sub-scores and their mean.
///
/// The overall score averages only the sub-scores that could be computed.
/// An empty record set scores `0.0` overall.
#[must_use]
pub fn assess(records: &[Record], config: &CollectorConfig) -> QualityMetrics {
    let completeness = check_completeness(records, &config.columns);
    let accuracy = check_accuracy(records);
    let consistency = check_consistency(records);
    let timeliness = check_timeliness(records, config.year.as_deref());

    let overall = if records.is_empty() {
        0.0
    } else {
        let scores: Vec<f64> = [Some(completeness), Some(accuracy), consistency, Some(timeliness)]
            .into_iter()
            .flatten()
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let count = scores.len() as f64;
        scores.iter().sum::<f64>() / count
    };

    QualityMetrics {
        completeness,
        accuracy,
        consistency,
        timeliness,
        overall,
    }
}

/// Distinct-value counts and samples for each configured column.
#[must_use]
pub fn analyze_distribution(records: &[Record], columns: &[String]) -> Vec<ColumnDistribution> {
    if records.is_empty() {
        return Vec::new();
    }

    columns
        .iter()
        .map(|column| {
            let values: Vec<&serde_json::Value> =
                records.iter().filter_map(|record| record.get(column)).collect();
            let unique: BTreeSet<String> = values.iter().map(ToString::to_string).collect();

            ColumnDistribution {
                column: column.clone(),
                unique_values: unique.len(),
                sample_values: values.into_iter().take(SAMPLE_SIZE).cloned().collect(),
            }
        })
        .collect()
}

/// Counts records with no fields left.
#[must_use]
pub fn detect_anomalies(records: &[Record]) -> AnomalySummary {
    AnomalySummary {
        missing_records: records.iter().filter(|record| record.is_empty()).count(),
    }
}

/// Assembles the full quality report.
#[must_use]
pub fn build_report(
    records: &[Record],
    config: &CollectorConfig,
    stats: &CollectionStats,
) -> QualityReport {
    let metrics = assess(records, config);

    QualityReport {
        summary: ReportSummary {
            total_records: records.len(),
            collection_success_rate: stats.success_rate(),
            overall_quality_score: metrics.overall,
        },
        completeness_analysis: CompletenessAnalysis {
            completeness: metrics.completeness,
        },
        data_distribution: analyze_distribution(records, &config.columns),
        anomaly_detection: detect_anomalies(records),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(values: &[serde_json::Value]) -> Vec<Record> {
        values
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn scenario_config() -> CollectorConfig {
        CollectorConfig::new("https://x")
            .with_year("2023")
            .with_state("OH")
            .with_columns(["year", "state", "deaths"])
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn scenario_record_scores_full_marks() {
        let recs = records(&[json!({"year": "2023", "state": "OH", "deaths": "5"})]);
        let metrics = assess(&recs, &scenario_config());

        assert!(approx(metrics.completeness, 1.0));
        assert!(approx(metrics.accuracy, 1.0));
        assert_eq!(metrics.consistency, Some(1.0));
        assert!(approx(metrics.timeliness, 1.0));
        assert!(approx(metrics.overall, 1.0));
    }

    #[test]
    fn empty_record_set_scores_zero() {
        let metrics = assess(&[], &scenario_config());
        assert!(approx(metrics.completeness, 0.0));
        assert!(approx(metrics.timeliness, 0.0));
        assert_eq!(metrics.consistency, None);
        assert!(approx(metrics.overall, 0.0));
    }

    #[test]
    fn completeness_counts_missing_and_empty_values() {
        let recs = records(&[
            json!({"year": "2023", "state": "OH", "deaths": "5"}),
            json!({"year": "2023", "state": "OH"}),
            json!({"year": "2023", "state": "", "deaths": "1"}),
            json!({"year": "2023", "state": "OH", "deaths": null}),
        ]);
        let cols = scenario_config().columns;
        assert!(approx(check_completeness(&recs, &cols), 0.25));
    }

    #[test]
    fn zero_is_not_an_empty_value() {
        let recs = records(&[json!({"deaths": 0})]);
        assert!(approx(check_completeness(&recs, &["deaths".to_string()]), 1.0));
    }

    #[test]
    fn no_columns_means_every_record_is_complete() {
        let recs = records(&[json!({"a": 1}), json!({})]);
        assert!(approx(check_completeness(&recs, &[]), 1.0));
    }

    #[test]
    fn consistency_distinguishes_mixed_from_uncomputable() {
        let same = records(&[json!({"year": "2023"}), json!({"year": 2023})]);
        assert_eq!(check_consistency(&same), Some(1.0));

        let mixed = records(&[json!({"year": "2022"}), json!({"year": "2023"})]);
        assert_eq!(check_consistency(&mixed), Some(0.5));

        let missing = records(&[json!({"year": "2023"}), json!({"state": "OH"})]);
        assert_eq!(check_consistency(&missing), None);
    }

    #[test]
    fn overall_skips_uncomputable_consistency() {
        let recs = records(&[json!({"state": "OH", "deaths": "5"})]);
        let config = scenario_config().with_columns(["state", "deaths"]);
        let metrics = assess(&recs, &config);

        assert_eq!(metrics.consistency, None);
        // completeness 1.0, accuracy 1.0, timeliness 0.0
        assert!(approx(metrics.overall, 2.0 / 3.0));
    }

    #[test]
    fn timeliness_compares_as_text() {
        let recs = records(&[
            json!({"year": "2023"}),
            json!({"year": 2023}),
            json!({"year": "2022"}),
            json!({}),
        ]);
        assert!(approx(check_timeliness(&recs, Some("2023")), 0.5));
        assert!(approx(check_timeliness(&recs, None), 0.0));
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let recs = records(&[
            json!({"year": "2023", "state": "OH"}),
            json!({"year": "1999", "deaths": ""}),
            json!({}),
        ]);
        let metrics = assess(&recs, &scenario_config());
        for score in [
            metrics.completeness,
            metrics.accuracy,
            metrics.timeliness,
            metrics.overall,
        ] {
            assert!((0.0..=1.0).contains(&score), "{score} out of range");
        }
    }

    #[test]
    fn distribution_counts_unique_values_and_samples() {
        let recs = records(&[
            json!({"state": "OH"}),
            json!({"state": "OH"}),
            json!({"state": "CA"}),
            json!({"state": "TX"}),
            json!({"state": "NY"}),
            json!({"state": "WA"}),
            json!({"year": "2023"}),
        ]);
        let dist = analyze_distribution(&recs, &["state".to_string()]);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist[0].unique_values, 5);
        assert_eq!(
            dist[0].sample_values,
            vec![json!("OH"), json!("OH"), json!("CA"), json!("TX"), json!("NY")]
        );
    }

    #[test]
    fn report_summarizes_run() {
        let recs = records(&[
            json!({"year": "2023", "state": "OH", "deaths": "5"}),
            json!({}),
        ]);
        let mut stats = CollectionStats::default();
        stats.record_attempt();
        stats.record_success();

        let report = build_report(&recs, &scenario_config(), &stats);
        assert_eq!(report.summary.total_records, 2);
        assert!(approx(report.summary.collection_success_rate, 1.0));
        assert!(approx(report.completeness_analysis.completeness, 0.5));
        assert_eq!(report.anomaly_detection.missing_records, 1);
        assert_eq!(report.data_distribution.len(), 3);
    }
}
