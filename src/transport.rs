//! Outbound HTTP collaborator.
//!
//! Adapters only ever see "GET with timeout, get back status and body". The
//! reqwest-backed implementation adds a small fixed retry on top.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
    Client,
};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid header {0}")]
    InvalidHeader(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
    attempts: u32,
    backoff: Duration,
}

impl ReqwestTransport {
    pub const DEFAULT_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

    pub fn build() -> Result<Self, TransportError> {
        Self::with_retry(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_BACKOFF)
    }

    pub fn with_retry(attempts: u32, backoff: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| TransportError::Request {
                url: String::new(),
                source,
            })?;
        Ok(Self {
            client,
            attempts: attempts.max(1),
            backoff,
        })
    }

    fn headers(request: &HttpRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            let mut header_value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            // only credentials travel as per-request headers
            header_value.set_sensitive(true);
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    async fn send_once(
        &self,
        request: &HttpRequest,
        headers: HeaderMap,
    ) -> Result<HttpResponse, TransportError> {
        let wrap = |source| TransportError::Request {
            url: request.url.clone(),
            source,
        };
        let res = self
            .client
            .get(&request.url)
            .query(&request.query)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(wrap)?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(wrap)?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = Self::headers(request)?;
        let mut attempt = 1;
        loop {
            let outcome = self.send_once(request, headers.clone()).await;
            let retryable = match &outcome {
                Ok(response) => !response.is_success(),
                Err(_) => true,
            };
            if !retryable || attempt >= self.attempts {
                return outcome;
            }
            match &outcome {
                Ok(response) => warn!(
                    "GET {} returned {}, retrying ({}/{})",
                    request.url, response.status, attempt, self.attempts
                ),
                Err(err) => warn!(
                    "GET {} failed: {}, retrying ({}/{})",
                    request.url, err, attempt, self.attempts
                ),
            }
            tokio::time::sleep(self.backoff).await;
            attempt += 1;
            debug!("GET {} attempt {}", request.url, attempt);
        }
    }
}
