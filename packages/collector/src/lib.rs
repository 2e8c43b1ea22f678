#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data collection agent for public JSON dataset APIs.
//!
//! A run is strictly sequential: load the configuration, issue one GET per
//! round ([`fetch`]), keep only the configured columns ([`filter`]), score
//! the result ([`quality`]), and persist records, metadata, and quality
//! reports ([`report`]). Between rounds the [`strategy`] module adapts the
//! inter-request delay to the running success rate.
//!
//! Only a missing or invalid configuration stops a run. Request failures,
//! malformed bodies, and file-write errors are logged through the injected
//! [`RunLog`] and degrade to empty results.

pub mod agent;
pub mod fetch;
pub mod filter;
pub mod progress;
pub mod quality;
pub mod report;
pub mod run_log;
pub mod strategy;

pub use agent::{DataCollectionAgent, RunSummary};
pub use data_collect_collector_models::Record;
pub use run_log::RunLog;
