//! Bearer token providers for backend requests

use async_trait::async_trait;
use backoffice_domain::Result;

/// Trait for providing access tokens
///
/// `Ok(None)` means "send the request unauthenticated". The executor treats
/// an error the same way after logging it.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>>;
}

/// Provider returning a fixed token, typically read from configuration or
/// the environment
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        let token = self.token.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }
}

/// Provider for backends that need no authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTokenProvider;

#[async_trait]
impl AccessTokenProvider for NoTokenProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
