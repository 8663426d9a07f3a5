//! reqwest-backed request executor
//!
//! One `execute` call is one candidate's share of a failover walk: up to
//! `retry.max_attempts` attempts with linear backoff, each bounded by the
//! operation class's timeout.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_common::{retry_with_policy, RetryConfig};
use backoffice_core::RequestExecutor;
use backoffice_domain::{
    EndpointCandidate, GatewayConfig, GatewayError, Operation, Payload, ResponseShape, Result,
    TimeoutSettings,
};
use reqwest::header::ACCEPT;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::{AccessTokenProvider, NoTokenProvider};
use super::client::HttpClient;
use crate::errors::conversions::broken_exchange;

/// Longest backend error body carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

pub struct HttpRequestExecutor {
    client: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    retry: RetryConfig,
    timeouts: TimeoutSettings,
}

impl HttpRequestExecutor {
    pub fn new(
        client: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
        retry: RetryConfig,
        timeouts: TimeoutSettings,
    ) -> Self {
        Self { client, tokens, retry, timeouts }
    }

    /// Executor using the configured retry policy and timeouts
    ///
    /// # Errors
    /// `GatewayError::Config` when the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        Ok(Self::new(
            HttpClient::new()?,
            tokens,
            RetryConfig::linear(config.retry.max_attempts, config.retry.backoff_step()),
            config.timeouts.clone(),
        ))
    }

    /// Unauthenticated executor with default settings
    ///
    /// # Errors
    /// `GatewayError::Config` when the HTTP client cannot be built.
    pub fn unauthenticated(config: &GatewayConfig) -> Result<Self> {
        Self::from_config(config, Arc::new(NoTokenProvider))
    }

    async fn bearer_token(&self) -> Option<String> {
        match self.tokens.access_token().await {
            Ok(token) => token,
            Err(error) => {
                warn!(error = %error, "access token unavailable, sending request unauthenticated");
                None
            }
        }
    }

    async fn attempt(&self, candidate: &EndpointCandidate, operation: &Operation, attempt: u32) -> Result<Payload> {
        let url = candidate.url_for(&operation.path);
        let mut request = self.client.request(operation.method, &url);
        if !operation.query.is_empty() {
            request = request.query(&operation.query);
        }
        if let Some(body) = &operation.body {
            request = request.json(body);
        }
        request = match operation.shape {
            ResponseShape::Binary => request.header(ACCEPT, "application/pdf"),
            ResponseShape::Json => request.header(ACCEPT, "application/json"),
        };
        if let Some(token) = self.bearer_token().await {
            request = request.bearer_auth(token);
        }

        debug!(attempt, url = %url, "attempting request");
        let exchange = async move {
            let response = self.client.send(request).await?;
            read_payload(response, operation.shape).await
        };

        match self.timeouts.for_class(operation.class) {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or(Err(GatewayError::Timeout(limit))),
            None => exchange.await,
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpRequestExecutor {
    #[instrument(
        skip_all,
        fields(address = %candidate.address, method = %operation.method, path = %operation.path)
    )]
    async fn execute(&self, candidate: &EndpointCandidate, operation: &Operation) -> Result<Payload> {
        let method = operation.method;
        let outcome = retry_with_policy(
            &self.retry,
            |attempt| self.attempt(candidate, operation, attempt),
            |error: &GatewayError| error.is_retryable_for(method),
        )
        .await;

        if let Err(error) = &outcome.result {
            debug!(attempts = outcome.attempts, error = %error, "candidate gave up");
        }
        outcome.into_result()
    }
}

async fn read_payload(response: Response, shape: ResponseShape) -> Result<Payload> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::from_status(status.as_u16(), error_message(status, &body)));
    }

    let bytes = response.bytes().await.map_err(|err| broken_exchange(&err))?;

    match shape {
        ResponseShape::Binary => Ok(Payload::Binary(bytes.to_vec())),
        ResponseShape::Json => {
            if status == StatusCode::NO_CONTENT
                || status == StatusCode::RESET_CONTENT
                || bytes.iter().all(u8::is_ascii_whitespace)
            {
                return Ok(Payload::Json(Value::Null));
            }
            serde_json::from_slice(&bytes)
                .map(Payload::Json)
                .map_err(|err| GatewayError::ParseFailure(format!("invalid JSON body: {err}")))
        }
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or("error"));
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
