use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

/// Why a request was not given an identity.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials were presented (401).
    #[error("Authentication required")]
    NotAuthenticated,

    /// Credentials were presented but matched no configured key (401).
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The `[auth]` section cannot produce a working authenticator (500).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Resolves request credentials to an [`Identity`] carrying a role.
///
/// Catalog writes and sync need [`super::Role::Admin`]; reads accept any
/// identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Value of `[auth] method` this authenticator serves, e.g. `"api_key"`.
    fn method_name(&self) -> &'static str;
}
