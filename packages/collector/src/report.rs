//! Output files: records, metadata, and quality reports.
//!
//! File names are derived from the configured state and year (`all` when
//! unset) and placed under `output_dir`:
//!
//! | Output | File |
//! |---|---|
//! | Filtered records | `<output_prefix>_<state>_<year>.json` |
//! | Metadata | `metadata_<state>_<year>.json` |
//! | HTML quality report | `quality_report.html` |
//! | Text quality report | `quality_report_<state>_<year>.txt` |
//!
//! Writers return [`ReportError`]; the agent logs those and carries on.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use data_collect_collector_models::{
    CollectionInfo, Metadata, QualityMetrics, QualityReport, Record, ReportSection,
};
use data_collect_config::CollectorConfig;
use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::agent::AGENT_VERSION;

/// File name of the HTML quality report.
pub const HTML_REPORT_FILE: &str = "quality_report.html";

/// Errors that can occur while writing output files.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// I/O error (directory creation, file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a document failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Formatting a rendered report failed.
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[must_use]
pub fn records_file_name(config: &CollectorConfig) -> String {
    format!(
        "{}_{}_{}.json",
        config.output_prefix,
        config.state_label(),
        config.year_label()
    )
}

#[must_use]
pub fn metadata_file_name(config: &CollectorConfig) -> String {
    format!(
        "metadata_{}_{}.json",
        config.state_label(),
        config.year_label()
    )
}

#[must_use]
pub fn text_report_file_name(config: &CollectorConfig) -> String {
    format!(
        "quality_report_{}_{}.txt",
        config.state_label(),
        config.year_label()
    )
}

/// Joins `file_name` onto the configured output directory.
#[must_use]
pub fn output_path(config: &CollectorConfig, file_name: &str) -> PathBuf {
    config.output_dir.join(file_name)
}

fn ensure_parent(path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes `value` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`ReportError`] if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportError> {
    ensure_parent(path)?;
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes `contents` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the write fails.
pub fn write_text(path: &Path, contents: &str) -> Result<(), ReportError> {
    ensure_parent(path)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Builds the metadata document for the current run.
#[must_use]
pub fn build_metadata(
    records: &[Record],
    config: &CollectorConfig,
    quality_metrics: QualityMetrics,
    processing_history: Vec<String>,
) -> Metadata {
    Metadata {
        collection_info: CollectionInfo {
            collection_date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            agent_version: AGENT_VERSION.to_string(),
            collector: config.collector.clone(),
            total_records: records.len(),
        },
        data_sources: vec![config.api_endpoint.clone()],
        quality_metrics,
        processing_history,
        variables: config.columns.clone(),
    }
}

/// Escapes text for inclusion in HTML element content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders the HTML quality report.
///
/// # Errors
///
/// Returns [`ReportError`] if a section cannot be serialized.
pub fn render_html(report: &QualityReport, config: &CollectorConfig) -> Result<String, ReportError> {
    let mut html = String::new();
    html.push_str("<html><head><title>Quality Report</title></head><body>\n");
    writeln!(
        html,
        "<h1>Quality Report - {} ({})</h1>",
        escape_html(config.state_label()),
        escape_html(config.year_label())
    )?;

    let summary = &report.summary;
    writeln!(html, "<h2>{}</h2><ul>", ReportSection::Summary.title())?;
    writeln!(html, "<li>total_records: {}</li>", summary.total_records)?;
    writeln!(
        html,
        "<li>collection_success_rate: {:.2}</li>",
        summary.collection_success_rate
    )?;
    writeln!(
        html,
        "<li>overall_quality_score: {:.2}</li>",
        summary.overall_quality_score
    )?;
    html.push_str("</ul>\n");

    for section in ReportSection::iter().filter(|s| *s != ReportSection::Summary) {
        let body = serde_json::to_string_pretty(&report.section_value(section)?)?;
        writeln!(
            html,
            "<h2>{}</h2><pre>{}</pre>",
            section.title(),
            escape_html(&body)
        )?;
    }

    html.push_str("</body></html>\n");
    Ok(html)
}

/// Renders the plain-text quality report: one `SECTION:` block per section.
///
/// # Errors
///
/// Returns [`ReportError`] if a section cannot be serialized.
pub fn render_text(report: &QualityReport) -> Result<String, ReportError> {
    let mut text = String::new();
    for section in ReportSection::iter() {
        let body = serde_json::to_string_pretty(&report.section_value(section)?)?;
        write!(
            text,
            "{}:\n{body}\n\n",
            section.as_ref().to_uppercase()
        )?;
    }
    Ok(text)
}
