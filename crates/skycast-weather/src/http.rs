//! Cached JSON GETs against the upstream provider.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use crate::cache::ResponseCache;
use crate::error::WeatherError;
use crate::key::{CacheKey, Endpoint, QueryParams};

const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the weather and geocoding fetchers.
///
/// Every call consults the response cache first; a miss performs exactly one
/// GET and caches the parsed body on success. Failures are never cached or
/// retried.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    cache: Arc<ResponseCache>,
}

impl UpstreamClient {
    pub fn new(timeout: Duration, cache: Arc<ResponseCache>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, cache })
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Fetch `url` with `params`, served from cache when fresh.
    #[instrument(skip(self, params), fields(endpoint = %endpoint), level = "debug")]
    pub async fn get_json(
        &self,
        endpoint: Endpoint,
        url: &str,
        params: &QueryParams,
    ) -> Result<Arc<Value>, WeatherError> {
        let key = CacheKey::new(endpoint, params);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        tracing::debug!(%key, "Cache miss, calling upstream");
        let response = self
            .client
            .get(url)
            .query(&params.to_query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let data: Value = serde_json::from_slice(&bytes)
            .map_err(|e| WeatherError::format(format!("response is not JSON: {}", e)))?;

        let data = Arc::new(data);
        self.cache.set(key, Arc::clone(&data));
        Ok(data)
    }
}
