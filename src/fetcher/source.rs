//! HTTP retrieval for the fetch pipeline
//!
//! This module provides:
//! 1. The [`ImageSource`] seam the pipeline is generic over
//! 2. A reqwest-backed implementation with a browser User-Agent and a fixed timeout
//! 3. Streaming of the response body into memory once the headers have been checked

use std::future::Future;
use std::time::Duration;

use futures::stream::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::{debug, info};

use crate::fetcher::AppConfig;

/// Error types for image retrieval
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Network(String),
}

/// Result type for retrieval operations
pub type SourceResult<T> = Result<T, SourceError>;

/// A response whose headers have arrived but whose body has not been read yet
pub trait SourceResponse: Send {
    /// Declared `Content-Type`, or an empty string if the header is missing
    fn content_type(&self) -> &str;

    /// Read the full body into memory
    fn read_all(self) -> impl Future<Output = SourceResult<Vec<u8>>> + Send;
}

/// Something that can retrieve the bytes behind a URL
pub trait ImageSource: Send + Sync {
    type Response: SourceResponse;

    /// Issue the request and return once headers are available.
    ///
    /// Transport failures and any status outside 2xx are errors.
    fn open(&self, url: &str) -> impl Future<Output = SourceResult<Self::Response>> + Send;
}

/// [`ImageSource`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// Create a new HTTP source
    pub fn new(user_agent: &str, timeout: Duration) -> SourceResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        info!("Initialized HTTP client with {}s timeout", timeout.as_secs());
        Ok(Self { client })
    }

    /// Create a new HTTP source from app config
    pub fn from_config(config: &AppConfig) -> SourceResult<Self> {
        Self::new(
            &config.network.user_agent,
            Duration::from_secs(config.network.timeout_secs),
        )
    }
}

impl ImageSource for HttpImageSource {
    type Response = HttpResponse;

    async fn open(&self, url: &str) -> SourceResult<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Network(format!("HTTP status {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        debug!(
            status = %response.status(),
            content_type = %content_type,
            content_length = ?response.content_length(),
            "Received response headers"
        );

        Ok(HttpResponse {
            response,
            content_type,
        })
    }
}

/// Response from [`HttpImageSource`]
pub struct HttpResponse {
    response: Response,
    content_type: String,
}

impl SourceResponse for HttpResponse {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    async fn read_all(self) -> SourceResult<Vec<u8>> {
        let capacity = self.response.content_length().unwrap_or(0) as usize;
        let mut body = Vec::with_capacity(capacity);

        let mut stream = self.response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        Ok(body)
    }
}
