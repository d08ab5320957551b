//! HTTP client abstraction used by the loader and the scraper.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal HTTP execution seam so fetching code can be tested against
/// stub clients.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain [`reqwest`] client with a request timeout.
///
/// The upstream site has been observed to hang; an unbounded fetch would
/// block the whole pipeline, so a timeout is always set.
pub struct BasicClient(reqwest::Client);

/// Default request timeout for census fetches.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl BasicClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// Fetches a URL and returns the response body as text, failing on
/// non-success status codes.
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let req = Request::new(reqwest::Method::GET, url.parse()?);
    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.text().await?)
}
