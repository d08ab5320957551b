//! One-shot scraper for the upstream census pages.
//!
//! Each invocation fetches the two pages that carry the live counts,
//! extracts the three numbers, and produces a single CSV row in the same
//! 4-column schema the loader consumes. Accumulating rows over time is
//! left to cron or an equivalent scheduler.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use regex::Regex;
use tracing::debug;

use crate::fetch::{HttpClient, fetch_text};
use crate::series::DATE_FORMAT;

pub const MAIN_PAGE_URL: &str = "http://www.faerytaleonline.com/";
pub const SIGNUP_PAGE_URL: &str = "http://www.faerytaleonline.com/signup.php";

/// One scraped observation, ready to be appended as a CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusRow {
    /// Timestamp in the fixed `MM/DD/YY-HH` format, UTC.
    pub date: String,
    pub birth_queue: i64,
    pub population: i64,
    pub pregnant: i64,
}

/// Fetches both pages and extracts the current census row, stamped with
/// the current UTC hour.
pub async fn scrape_row<C: HttpClient>(client: &C) -> Result<CensusRow> {
    let main_page = fetch_text(client, MAIN_PAGE_URL)
        .await
        .context("fetching main page")?;
    let signup_page = fetch_text(client, SIGNUP_PAGE_URL)
        .await
        .context("fetching signup page")?;

    let row = CensusRow {
        date: Utc::now().format(DATE_FORMAT).to_string(),
        birth_queue: extract_birth_queue(&signup_page)?,
        population: extract_population(&main_page)?,
        pregnant: extract_pregnant(&signup_page)?,
    };
    debug!(?row, "Scraped census row");
    Ok(row)
}

/// Population count from the main page, written as "Population: N"
/// (possibly with markup between the label and the number).
pub fn extract_population(html: &str) -> Result<i64> {
    extract_count(html, r"Population:\D*(\d+)", "population")
}

/// Birth-queue size from the signup page; the number follows the
/// "Current size of birth queue" label.
pub fn extract_birth_queue(html: &str) -> Result<i64> {
    extract_count(html, r"Current size of birth queue\D*(\d+)", "birth queue")
}

/// Pregnant-mothers count from the signup page; the number follows the
/// "Number of pregnant" label.
pub fn extract_pregnant(html: &str) -> Result<i64> {
    extract_count(html, r"Number of pregnant\D*(\d+)", "pregnant mothers")
}

fn extract_count(html: &str, pattern: &str, what: &str) -> Result<i64> {
    let re = Regex::new(pattern)?;
    let captures = re
        .captures(html)
        .ok_or_else(|| anyhow!("could not find {what} count in page"))?;
    captures[1]
        .parse()
        .with_context(|| format!("parsing {what} count"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_population() {
        let html = "<body><p>Population: 412</p></body>";
        assert_eq!(extract_population(html).unwrap(), 412);
    }

    #[test]
    fn test_extract_population_with_markup_between() {
        let html = "Population:</td><td><b> 97 </b>";
        assert_eq!(extract_population(html).unwrap(), 97);
    }

    #[test]
    fn test_extract_birth_queue() {
        let html = "Current size of birth queue:</span> <span>23</span>";
        assert_eq!(extract_birth_queue(html).unwrap(), 23);
    }

    #[test]
    fn test_extract_pregnant() {
        let html = "Number of pregnant mothers: <b>4</b>";
        assert_eq!(extract_pregnant(html).unwrap(), 4);
    }

    #[test]
    fn test_extract_missing_label_errors() {
        let err = extract_population("<body>nothing here</body>").unwrap_err();
        assert!(err.to_string().contains("population"));
    }

    #[test]
    fn test_scraped_date_matches_loader_format() {
        let date = Utc::now().format(DATE_FORMAT).to_string();
        assert!(crate::series::parse_timestamp(&date).is_some());
    }

    /// Stub client serving a canned copy of each upstream page.
    struct SiteStub;

    #[async_trait::async_trait]
    impl HttpClient for SiteStub {
        async fn execute(
            &self,
            req: reqwest::Request,
        ) -> reqwest::Result<reqwest::Response> {
            let body = if req.url().path() == "/signup.php" {
                "Current size of birth queue: <b>23</b><br>Number of pregnant mothers: <b>4</b>"
            } else {
                "<p>Population: 412</p>"
            };
            let resp = http::Response::builder()
                .status(200)
                .body(body.to_string())
                .expect("canned response");
            Ok(resp.into())
        }
    }

    #[tokio::test]
    async fn test_scrape_row_extracts_all_three_counts() {
        let row = scrape_row(&SiteStub).await.unwrap();
        assert_eq!(row.birth_queue, 23);
        assert_eq!(row.population, 412);
        assert_eq!(row.pregnant, 4);
        assert!(crate::series::parse_timestamp(&row.date).is_some());
    }
}
