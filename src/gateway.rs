//! The retry-governed classify pipeline.
//!
//! One classify call is one logical task: build the provider body, POST it,
//! classify the response, and retry only on HTTP 429 with a capped
//! exponential backoff that honors a server-supplied `Retry-After` hint.
//! Both suspension points (the network await and the backoff sleep) suspend
//! only the calling task and honor an optional cancellation token. Retry
//! state is local to the call; the gateway itself is stateless across calls
//! apart from the shared connection pool.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ProviderConfig;
use crate::drivers;
use crate::error::{Error, Result};
use crate::extract;
use crate::notify::{noop_sink, NotificationSink};
use crate::transport::HttpTransport;
use crate::types::{ClassificationRequest, GatewayResult};

/// Stateless front door: builds provider requests, governs retries, and feeds
/// raw model text through the result extractor.
pub struct ModelGateway {
    transport: HttpTransport,
    sink: Arc<dyn NotificationSink>,
}

impl ModelGateway {
    /// Gateway with the default no-op notification sink.
    pub fn new() -> Result<Self> {
        Self::with_sink(noop_sink())
    }

    /// Gateway reporting progress through `sink`.
    pub fn with_sink(sink: Arc<dyn NotificationSink>) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new()?,
            sink,
        })
    }

    /// Classifies `request` against the configured provider.
    ///
    /// Never returns an error at the type level: terminal failures surface as
    /// [`GatewayResult::Failure`], unparseable model output as
    /// [`GatewayResult::RawText`].
    pub async fn classify(
        &self,
        config: &ProviderConfig,
        request: &ClassificationRequest,
    ) -> GatewayResult {
        self.classify_inner(config, request, None).await
    }

    /// Like [`classify`](Self::classify), aborting early when `cancel` fires.
    ///
    /// Cancellation is observed at the network await and during backoff
    /// sleeps.
    pub async fn classify_with_cancel(
        &self,
        config: &ProviderConfig,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> GatewayResult {
        self.classify_inner(config, request, Some(cancel)).await
    }

    async fn classify_inner(
        &self,
        config: &ProviderConfig,
        request: &ClassificationRequest,
        cancel: Option<&CancellationToken>,
    ) -> GatewayResult {
        match self.complete(config, request, cancel).await {
            Ok(raw) => extract::parse(&raw),
            Err(err) => {
                self.sink.notify(&format!("Error: {err}"), true).await;
                err.into_failure()
            }
        }
    }

    /// Raw model text for one request, after the 429 retry loop.
    ///
    /// Exposed for callers that want to run their own parsing instead of
    /// [`extract::parse`].
    pub async fn complete(
        &self,
        config: &ProviderConfig,
        request: &ClassificationRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<String> {
        if request.tag_vocabulary.is_empty() {
            return Err(Error::Validation(
                "tag vocabulary is empty; define at least one tag before dispatch".into(),
            ));
        }

        let driver = drivers::for_provider(config.provider);
        let body = driver.build_request(request, config);

        self.sink
            .notify(&format!("Processing with {}...", config.provider), false)
            .await;

        let mut attempt: u32 = 0;
        loop {
            let start = std::time::Instant::now();
            let resp = self
                .with_cancel(cancel, self.transport.post(config, &body))
                .await??;
            let status = resp.status().as_u16();

            if status == 429 {
                if attempt >= config.max_retries {
                    self.sink
                        .notify(
                            &format!(
                                "Maximum retry attempts reached for {}.",
                                config.provider
                            ),
                            true,
                        )
                        .await;
                    return Err(Error::RateLimited("max retries reached".into()));
                }
                let wait_secs =
                    retry_after_secs(resp.headers()).unwrap_or_else(|| backoff_secs(attempt));
                warn!(
                    provider = %config.provider,
                    attempt,
                    wait_secs,
                    "rate limited, backing off"
                );
                self.sink
                    .notify(
                        &format!(
                            "Rate limited by {}. Retrying in {} seconds...",
                            config.provider, wait_secs
                        ),
                        false,
                    )
                    .await;
                self.with_cancel(cancel, tokio::time::sleep(Duration::from_secs(wait_secs)))
                    .await?;
                attempt += 1;
                continue;
            }

            let json: serde_json::Value = self
                .with_cancel(cancel, resp.json())
                .await?
                .map_err(Error::Transport)?;

            // Providers report failures in the body regardless of status code.
            if let Some(error) = json.get("error") {
                let message = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                info!(
                    provider = %config.provider,
                    http_status = status,
                    "provider reported an error"
                );
                return Err(Error::Provider(message));
            }

            let content = driver.extract_content(&json)?;
            info!(
                provider = %config.provider,
                http_status = status,
                attempts = attempt + 1,
                duration_ms = start.elapsed().as_millis() as u64,
                "classification request completed"
            );
            return Ok(content);
        }
    }

    async fn with_cancel<T>(
        &self,
        cancel: Option<&CancellationToken>,
        fut: impl Future<Output = T>,
    ) -> Result<T> {
        match cancel {
            None => Ok(fut.await),
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(Error::Cancelled("call aborted by caller".into())),
                out = fut => Ok(out),
            },
        }
    }
}

/// Server backoff hint, when the `Retry-After` header carries whole seconds.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Fallback wait before retry `attempt + 1`: 2^(attempt+1) seconds.
fn backoff_secs(attempt: u32) -> u64 {
    1u64.checked_shl(attempt + 1).unwrap_or(u64::MAX)
}
