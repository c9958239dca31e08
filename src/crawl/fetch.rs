// src/crawl/fetch.rs
// =============================================================================
// Fetching a URL, behind a small trait so the scheduler can be driven by a
// fake in tests.
//
// `HttpFetcher` is the real thing: one shared reqwest client (connection
// pooling), a per-request timeout and an optional proxy. Status codes are
// not judged here; the scheduler decides what counts as success.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

// What came back from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

#[cfg(test)]
impl FetchResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, proxy_url: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shop-crawler/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(proxy_url) = proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }

    // Timeouts get their own variant so the logs say what happened
    fn categorize_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::from(error)
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json, text/plain")
            .send()
            .await
            .map_err(|e| self.categorize_error(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| self.categorize_error(e))?;

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}
