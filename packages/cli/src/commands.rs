//! Subcommand implementations shared by the flag-driven and interactive
//! front ends.

use std::path::Path;
use std::time::Instant;

use data_collect_cli_utils::{IndicatifProgress, MultiProgress};
use data_collect_collector::{DataCollectionAgent, RunLog};
use data_collect_demo::{cat_facts, holidays, probe as probe_endpoint};

/// Loads the configuration and runs the collection pipeline.
///
/// # Errors
///
/// Returns an error if the configuration is missing or invalid, or the
/// HTTP client cannot be built. Request and write failures are logged and
/// do not fail the run.
pub async fn collect(
    config_path: &Path,
    rounds: u32,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = data_collect_config::load_config(config_path)?;

    let mut agent = DataCollectionAgent::new(config, RunLog::default())?;
    let rounds = rounds.max(1);
    let progress = IndicatifProgress::steps_bar(multi, "Collecting", u64::from(rounds));

    let summary = agent.run(rounds, &progress).await;

    log::info!(
        "Collection finished in {:.1}s: {} records, success rate {:.2}, quality {:.2}",
        start.elapsed().as_secs_f64(),
        summary.records,
        summary.stats.success_rate(),
        summary.metrics.overall
    );
    Ok(())
}

/// Requests the configured endpoint once and prints the result.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub async fn probe(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = data_collect_config::load_config(config_path)?;

    match probe_endpoint::probe(&config).await {
        Ok(result) => println!("{result}"),
        Err(e) => println!("Failed to retrieve data: {e}"),
    }
    Ok(())
}

/// Fetches `count` cat facts and writes them to `output`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built. A failed write is
/// logged.
pub async fn cat_facts(
    count: usize,
    output: &Path,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = cat_facts::build_client()?;
    let progress = IndicatifProgress::spinner(multi, "Fetching cat facts");
    let facts =
        cat_facts::collect_cat_facts(&client, cat_facts::CAT_FACT_URL, count, &progress).await;

    if let Err(e) = cat_facts::save_cat_facts(output, &facts) {
        log::error!("Failed to save cat facts: {e}");
    }
    Ok(())
}

/// Prints public holidays for each country and a count summary.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built. Countries whose
/// request fails are logged and skipped.
pub async fn holidays(countries: &[String], year: i32) -> Result<(), Box<dyn std::error::Error>> {
    let client = holidays::build_client()?;
    let collected =
        holidays::collect_holidays(&client, holidays::HOLIDAYS_BASE_URL, countries, year).await;

    print!("{}", holidays::format_listing(&collected, year));
    print!("{}", holidays::format_summary(&collected, year));
    Ok(())
}
