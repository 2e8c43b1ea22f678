//! Menu-driven front end over the subcommands.

use std::path::PathBuf;

use data_collect_cli_utils::MultiProgress;
use data_collect_config::DEFAULT_CONFIG_FILE;
use data_collect_demo::cat_facts::{CAT_FACTS_FILE, DEFAULT_FACT_COUNT};
use data_collect_demo::holidays::{DEFAULT_COUNTRIES, DEFAULT_HOLIDAY_YEAR};
use dialoguer::{Input, Select};

use crate::commands;

enum Action {
    Collect,
    Probe,
    CatFacts,
    Holidays,
}

impl Action {
    const ALL: &[Self] = &[Self::Collect, Self::Probe, Self::CatFacts, Self::Holidays];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Collect => "Collect dataset and write reports",
            Self::Probe => "Probe dataset endpoint",
            Self::CatFacts => "Fetch cat facts",
            Self::Holidays => "List public holidays",
        }
    }
}

fn prompt_config_path() -> Result<PathBuf, dialoguer::Error> {
    let path: String = Input::new()
        .with_prompt("Config file")
        .default(DEFAULT_CONFIG_FILE.to_string())
        .interact_text()?;
    Ok(PathBuf::from(path))
}

/// Prompts for a tool and its options, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected tool fails fatally.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Data Collection Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Collect => {
            let config = prompt_config_path()?;
            let rounds_str: String = Input::new()
                .with_prompt("Rounds")
                .default("1".to_string())
                .interact_text()?;
            let rounds: u32 = rounds_str.parse().unwrap_or(1);
            commands::collect(&config, rounds, multi).await?;
        }
        Action::Probe => {
            let config = prompt_config_path()?;
            commands::probe(&config).await?;
        }
        Action::CatFacts => {
            let count_str: String = Input::new()
                .with_prompt("How many facts?")
                .default(DEFAULT_FACT_COUNT.to_string())
                .interact_text()?;
            let count: usize = count_str.parse().unwrap_or(DEFAULT_FACT_COUNT);
            commands::cat_facts(count, &PathBuf::from(CAT_FACTS_FILE), multi).await?;
        }
        Action::Holidays => {
            let year_str: String = Input::new()
                .with_prompt("Year")
                .default(DEFAULT_HOLIDAY_YEAR.to_string())
                .interact_text()?;
            let year: i32 = year_str.parse().unwrap_or(DEFAULT_HOLIDAY_YEAR);

            let countries_str: String = Input::new()
                .with_prompt("Countries (comma-separated)")
                .default(DEFAULT_COUNTRIES.join(","))
                .interact_text()?;
            let countries: Vec<String> = countries_str
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_uppercase)
                .collect();
            commands::holidays(&countries, year).await?;
        }
    }

    Ok(())
}
