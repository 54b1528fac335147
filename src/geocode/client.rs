// Geocoding clients.
// A raw HTTP client plus a wrapper adding normalization, rate limiting, and retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use tracing::debug;

use crate::config::GeocoderConfig;
use crate::error::{Result, SyncError};
use crate::limiter::{RateLimiter, RetryPolicy};

use super::normalize::normalize_address;
use super::types::{Coordinates, GeocodeResponse};

/// Address-to-coordinates lookup.
///
/// `Ok(None)` means the service answered but found no candidate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}

/// Single-request HTTP geocoder authenticated with an API-key header.
pub struct HttpGeocoder {
    client: Client,
    base_url: Url,
}

impl HttpGeocoder {
    /// Create a client authenticated with a REST API key.
    pub fn new(config: &GeocoderConfig, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("KakaoAK {}", api_key))
                .map_err(|e| SyncError::Config(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SyncError::Config(format!("geocoder.base_url: {}", e)))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("query", address)])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: GeocodeResponse = response.json().await?;
                body.first_match()
            }
            StatusCode::TOO_MANY_REQUESTS => Err(SyncError::QuotaExceeded(format!(
                "geocoder rejected {:?}",
                address
            ))),
            status => Err(SyncError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Wraps a geocoder with query normalization, the shared limiter, and retries.
///
/// Layering, innermost first: the limiter (quota backoff), one extra fixed
/// wait after a quota rejection, then exponential retries for network
/// failures and timeouts.
pub struct ResilientGeocoder<G> {
    inner: G,
    limiter: Arc<RateLimiter>,
    default_region: String,
    quota_retry: RetryPolicy,
    network_retry: RetryPolicy,
}

impl<G: Geocoder> ResilientGeocoder<G> {
    /// Wrap `inner` using the shared limiter and the configured retry settings.
    pub fn new(inner: G, limiter: Arc<RateLimiter>, config: &GeocoderConfig) -> Self {
        Self {
            inner,
            limiter,
            default_region: config.default_region.clone(),
            quota_retry: RetryPolicy::fixed(Duration::from_millis(config.quota_retry_delay_ms), 1),
            network_retry: RetryPolicy::transient(
                Duration::from_millis(config.network_backoff_ms),
                config.network_retries,
            ),
        }
    }

    /// The wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for ResilientGeocoder<G> {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let query = normalize_address(address, &self.default_region);
        if query.is_empty() {
            return Ok(None);
        }
        debug!(%query, "geocoding");

        let query = query.as_str();
        let inner = &self.inner;
        let limiter = &self.limiter;
        let quota_retry = &self.quota_retry;
        self.network_retry
            .run("geocode", move || {
                quota_retry.run("geocode quota", move || {
                    limiter.execute(move || inner.geocode(query))
                })
            })
            .await
    }
}
