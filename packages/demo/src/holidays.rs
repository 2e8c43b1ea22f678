//! Public holidays from the Nager.Date API.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DemoError, get_ok};

pub const HOLIDAYS_BASE_URL: &str = "https://date.nager.at/api/v3";

pub const DEFAULT_HOLIDAY_YEAR: i32 = 2024;

pub const DEFAULT_COUNTRIES: &[&str] = &["US", "CA", "GB"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One public holiday as returned by `PublicHolidays/{year}/{country}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: String,
    pub local_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Holidays fetched for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryHolidays {
    pub country: String,
    pub holidays: Vec<Holiday>,
}

/// Builds a client for the holidays API.
///
/// # Errors
///
/// Returns [`DemoError::Http`] if the client cannot be constructed.
pub fn build_client() -> Result<reqwest::Client, DemoError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Fetches the public holidays of `country` in `year`.
///
/// # Errors
///
/// Returns [`DemoError`] on transport failure, a non-2xx status, or an
/// unexpected body.
pub async fn get_public_holidays(
    client: &reqwest::Client,
    base_url: &str,
    country: &str,
    year: i32,
) -> Result<Vec<Holiday>, DemoError> {
    let url = format!(
        "{}/PublicHolidays/{year}/{country}",
        base_url.trim_end_matches('/')
    );
    Ok(get_ok(client, &url).await?.json().await?)
}

/// Fetches holidays for each country in turn. Countries whose request
/// fails are logged and left out.
pub async fn collect_holidays(
    client: &reqwest::Client,
    base_url: &str,
    countries: &[String],
    year: i32,
) -> Vec<CountryHolidays> {
    let mut collected = Vec::with_capacity(countries.len());
    for country in countries {
        match get_public_holidays(client, base_url, country, year).await {
            Ok(holidays) => collected.push(CountryHolidays {
                country: country.clone(),
                holidays,
            }),
            Err(e) => log::error!("Request failed for {country}: {e}"),
        }
    }
    collected
}

/// Lists each country's holidays as `date: localName` lines.
#[must_use]
pub fn format_listing(collected: &[CountryHolidays], year: i32) -> String {
    let mut out = String::new();
    for entry in collected {
        let _ = writeln!(out, "\n{} Public Holidays in {year}:", entry.country);
        for holiday in &entry.holidays {
            let _ = writeln!(out, "{}: {}", holiday.date, holiday.local_name);
        }
    }
    out
}

/// Per-country holiday counts.
#[must_use]
pub fn format_summary(collected: &[CountryHolidays], year: i32) -> String {
    let mut out = format!("Holiday Count Summary for {year}\n");
    for entry in collected {
        let _ = writeln!(out, "{}: {} holidays", entry.country, entry.holidays.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn holiday(date: &str, local_name: &str) -> Holiday {
        Holiday {
            date: date.to_string(),
            local_name: local_name.to_string(),
            name: None,
            country_code: None,
        }
    }

    #[tokio::test]
    async fn fetches_per_country_and_skips_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/PublicHolidays/2024/US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": "2024-01-01", "localName": "New Year's Day", "name": "New Year's Day", "countryCode": "US"},
                {"date": "2024-07-04", "localName": "Independence Day", "name": "Independence Day", "countryCode": "US"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/PublicHolidays/2024/XX"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let countries = vec!["US".to_string(), "XX".to_string()];
        let collected = collect_holidays(&client, &server.uri(), &countries, 2024).await;

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].country, "US");
        assert_eq!(collected[0].holidays[1].local_name, "Independence Day");
    }

    #[test]
    fn listing_and_summary_format() {
        let collected = vec![CountryHolidays {
            country: "CA".to_string(),
            holidays: vec![
                holiday("2024-01-01", "New Year's Day"),
                holiday("2024-07-01", "Canada Day"),
            ],
        }];

        let listing = format_listing(&collected, 2024);
        assert!(listing.contains("CA Public Holidays in 2024:"));
        assert!(listing.contains("2024-07-01: Canada Day"));

        let summary = format_summary(&collected, 2024);
        assert_eq!(summary, "Holiday Count Summary for 2024\nCA: 2 holidays\n");
    }
}
