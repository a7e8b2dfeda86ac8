use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::feed::FeedPayload;

#[derive(Debug, Error)]
pub enum NasaError {
    #[error("request to NASA feed failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("NASA feed returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("NASA feed returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the NeoWs `/feed` endpoint.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    feed_url: String,
    api_key: String,
}

impl FeedClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            feed_url: config.nasa_feed_url.clone(),
            api_key: config.nasa_api_key.clone(),
        }
    }

    #[instrument(skip(self), fields(url = %self.feed_url))]
    pub async fn try_fetch(&self) -> Result<FeedPayload, NasaError> {
        let response = self
            .client
            .get(&self.feed_url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await
            // The request URL carries the access key; keep it out of messages.
            .map_err(|e| NasaError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NasaError::Status(status));
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| NasaError::Decode(e.without_url()))?;
        debug!(element_count = ?value.get("element_count"), "Received NASA feed");
        Ok(FeedPayload::new(value))
    }

    /// Fetches the feed, folding any failure into an error-flagged payload.
    pub async fn fetch(&self) -> FeedPayload {
        match self.try_fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("NASA feed fetch failed: {}", e);
                FeedPayload::error(e.to_string())
            }
        }
    }
}
