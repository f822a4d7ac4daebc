//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Rate limit error handling

use crate::error::RegistryError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("pipstale/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Send a request with retry logic and error context.
    ///
    /// Timeouts, connection failures and 429 are retried with exponential
    /// backoff. 404 maps to `PackageNotFound`, other non-2xx to `NetworkError`.
    async fn send_with_retry<F>(
        &self,
        build: F,
        package: &str,
        registry: &str,
    ) -> Result<Response, RegistryError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match build().send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(RegistryError::rate_limit_exceeded(registry));
                    } else if status == StatusCode::NOT_FOUND {
                        return Err(RegistryError::package_not_found(package, registry));
                    } else if !status.is_success() {
                        return Err(RegistryError::network_error(
                            package,
                            registry,
                            format!("HTTP {}", status),
                        ));
                    } else {
                        return Ok(response);
                    }
                }
                Err(e) if e.is_timeout() => {
                    last_error = Some(RegistryError::timeout(package, registry));
                }
                Err(e) => {
                    last_error = Some(RegistryError::network_error(
                        package,
                        registry,
                        e.to_string(),
                    ));
                }
            }

            if attempt < self.max_retries {
                debug!(package, registry, attempt, delay_ms = delay, "retrying request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network_error(package, registry, "unknown error")))
    }

    /// Decode a JSON body, retrying the whole request on parse errors
    async fn json_with_retry<T, F>(
        &self,
        build: F,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            // Network errors are already retried in send_with_retry
            let response = self.send_with_retry(&build, package, registry).await?;

            match response.json::<T>().await {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    last_error = Some(RegistryError::InvalidResponse {
                        package: package.to_string(),
                        registry: registry.to_string(),
                        message: format!("failed to parse JSON: {}", e),
                    });

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RegistryError::InvalidResponse {
            package: package.to_string(),
            registry: registry.to_string(),
            message: "unknown JSON parse error".to_string(),
        }))
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        self.json_with_retry(|| self.client.get(url), package, registry)
            .await
    }

    /// Perform a POST request with a JSON body and parse the JSON response
    pub async fn post_json<B, T>(
        &self,
        url: &str,
        body: &B,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json_with_retry(|| self.client.post(url).json(body), package, registry)
            .await
    }
}
