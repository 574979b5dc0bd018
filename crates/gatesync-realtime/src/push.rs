//! HTTP push provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use gatesync_core::config::push::PushConfig;
use gatesync_core::error::AppError;
use gatesync_core::result::AppResult;
use gatesync_core::traits::push::{PushMessage, PushOutcome, PushProvider};

/// Token-addressed push delivery over the provider's HTTP API.
///
/// Transport failures surface as [`PushOutcome::Failed`] rather than
/// errors: push is a best-effort nudge and the caller only logs failures.
#[derive(Debug)]
pub struct HttpPushProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpPushProvider {
    /// Build a provider from configuration.
    pub fn from_config(config: &PushConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    gatesync_core::error::ErrorKind::Configuration,
                    "Failed to build push HTTP client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PushProvider for HttpPushProvider {
    fn provider_type(&self) -> &str {
        "http"
    }

    async fn send(&self, token: &str, message: &PushMessage) -> AppResult<PushOutcome> {
        let payload = serde_json::json!({
            "to": token,
            "title": message.title,
            "body": message.body,
            "data": message.data,
        });

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Ok(PushOutcome::Failed(e.to_string())),
        };

        let status = response.status();
        if status.is_success() {
            debug!(token = %token, "Push accepted by provider");
            return Ok(PushOutcome::Delivered);
        }

        // Providers signal dead tokens with 404/410; everything else is
        // treated as transient.
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Ok(PushOutcome::InvalidToken);
        }

        let body = response.text().await.unwrap_or_default();
        Ok(PushOutcome::Failed(format!("provider returned {status}: {body}")))
    }
}
