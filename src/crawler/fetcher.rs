//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests returning the body as text
//! - GET requests returning the body as a stream of byte chunks
//! - Error classification
//!
//! Requests are attempted once; a failure is returned to the caller, which
//! decides whether it aborts the enclosing task.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::storage::ByteStream;
use crate::{FetchError, FetchResult};
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Response};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use story_archiver::config::{CrawlerConfig, UserAgentConfig};
/// use story_archiver::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Stateless wrapper around a shared HTTP client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> FetchResult<Self> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }

    /// Fetches `url` and decodes the body as text
    pub async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches `url` and returns the body as a stream of byte chunks
    ///
    /// The status line is checked before the stream is returned; errors
    /// while reading chunks surface as items of the stream.
    pub async fn fetch_stream(&self, url: &str) -> FetchResult<ByteStream> {
        let response = self.get(url).await?;
        let owned_url = url.to_string();

        Ok(response
            .bytes_stream()
            .map_err(move |source| FetchError::Body {
                url: owned_url.clone(),
                source,
            })
            .boxed())
    }

    async fn get(&self, url: &str) -> FetchResult<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
