//! The fetch seam: a narrow trait the pipeline depends on, plus the
//! default HTTP implementation with bounded concurrency and retry.

use crate::forcing::error::ForcingDataError;
use crate::forcing::request::{ServiceRequest, SERVICE_URL};
use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use log::{info, warn};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retrieves raw service responses for the pipeline.
///
/// Implementations must return one body per request, in request order;
/// the reassembler matches responses to requests positionally. Transient
/// failures are retried internally; an exhausted request fails the whole
/// batch.
#[async_trait]
pub trait ForcingFetcher: Send + Sync {
    /// One text body per request, in request order.
    async fn retrieve_text(
        &self,
        requests: &[ServiceRequest],
    ) -> Result<Vec<String>, ForcingDataError>;

    /// A binary asset from a fixed URL (the grid-mask file).
    async fn retrieve_binary(&self, url: &str) -> Result<Vec<u8>, ForcingDataError>;
}

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Endpoint serving the time series.
    pub endpoint: String,
    /// Maximum simultaneous in-flight requests.
    pub max_workers: usize,
    /// Retries per request after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles per retry.
    pub initial_retry_delay: Duration,
    /// Upper bound on the retry delay.
    pub max_retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: SERVICE_URL.to_string(),
            max_workers: 4,
            max_retries: 3,
            initial_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

/// The default [`ForcingFetcher`]: a shared `reqwest` client issuing
/// requests through an ordered buffered stream.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn send_once(&self, request: &ServiceRequest) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&request.query_params())
            .send()
            .await?;
        let response = response.error_for_status()?;
        response.text().await
    }

    async fn send_binary_once(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Runs one attempt plus up to `max_retries` retries with doubling
    /// delay. On give-up, returns the last error and the attempt count.
    async fn with_retry<T, F, Fut>(&self, attempt: F) -> Result<T, (reqwest::Error, u32)>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut delay = self.config.initial_retry_delay;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if attempts <= self.config.max_retries && is_transient(&err) => {
                    warn!(
                        "Transient fetch failure (attempt {}/{}): {}",
                        attempts,
                        self.config.max_retries + 1,
                        err
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(self.config.max_retry_delay);
                }
                Err(err) => return Err((err, attempts)),
            }
        }
    }

    fn classify(&self, err: reqwest::Error, attempts: u32) -> ForcingDataError {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| self.config.endpoint.clone());
        if attempts > 1 {
            ForcingDataError::RetriesExhausted {
                url,
                attempts,
                source: err,
            }
        } else if err.is_status() {
            ForcingDataError::HttpStatus {
                url,
                status: err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                source: err,
            }
        } else if err.is_decode() || err.is_body() {
            ForcingDataError::BodyRead(url, err)
        } else {
            ForcingDataError::NetworkRequest(url, err)
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForcingFetcher for HttpFetcher {
    async fn retrieve_text(
        &self,
        requests: &[ServiceRequest],
    ) -> Result<Vec<String>, ForcingDataError> {
        info!(
            "Fetching {} service requests ({} in flight)",
            requests.len(),
            self.config.max_workers
        );
        // Owned items: the boxed futures outlive any borrow of the slice.
        stream::iter(requests.to_vec())
            .map(|request| async move {
                self.with_retry(|| self.send_once(&request))
                    .await
                    .map_err(|(err, attempts)| self.classify(err, attempts))
            })
            .buffered(self.config.max_workers.max(1))
            .try_collect()
            .await
    }

    async fn retrieve_binary(&self, url: &str) -> Result<Vec<u8>, ForcingDataError> {
        info!("Fetching binary asset from {url}");
        self.with_retry(|| self.send_binary_once(url))
            .await
            .map_err(|(err, attempts)| self.classify(err, attempts))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    err.status()
        .map(|s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::coords::LonLat;
    use chrono::NaiveDate;

    fn sample_request() -> ServiceRequest {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ServiceRequest {
            variable: "NLDAS:NLDAS_FORA0125_H.002:TMP2m".to_string(),
            location: LonLat(-100.0, 40.0),
            start,
            end: start + chrono::Duration::days(3),
        }
    }

    #[test]
    fn config_defaults_match_the_service_contract() {
        let config = FetchConfig::default();
        assert_eq!(config.endpoint, SERVICE_URL);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.max_retries, 3);
        assert!(config.initial_retry_delay < config.max_retry_delay);
    }

    #[test]
    fn fetcher_uses_default_config() {
        let fetcher = HttpFetcher::new();
        assert_eq!(fetcher.config().max_workers, 4);
        assert!(fetcher.config().endpoint.contains("timeseries.cgi"));
    }

    #[tokio::test]
    async fn refused_connection_fails_the_whole_batch() {
        // Reserve a port, then free it so connections are refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let fetcher = HttpFetcher::with_config(FetchConfig {
            endpoint,
            max_retries: 0,
            ..FetchConfig::default()
        });

        let requests = vec![sample_request(), sample_request()];
        let err = fetcher.retrieve_text(&requests).await.unwrap_err();
        assert!(matches!(err, ForcingDataError::NetworkRequest(..)));
    }
}
