//! API Key authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity, Role};

/// Authenticator that validates requests against configured API keys.
///
/// The admin key grants [`Role::Admin`]; the optional user key grants
/// [`Role::User`]. Accepts the key in either:
/// - `Authorization: Bearer <key>` header
/// - `X-API-Key: <key>` header
pub struct ApiKeyAuthenticator {
    admin_key: String,
    user_key: Option<String>,
}

impl ApiKeyAuthenticator {
    pub fn new(admin_key: String, user_key: Option<String>) -> Self {
        Self {
            admin_key,
            user_key,
        }
    }

    /// Extract API key from request headers.
    /// Checks Authorization: Bearer and X-API-Key headers.
    fn extract_key(&self, request: &AuthRequest) -> Option<String> {
        if let Some(auth_header) = request.headers.get("authorization") {
            if let Some(key) = auth_header
                .strip_prefix("Bearer ")
                .or_else(|| auth_header.strip_prefix("bearer "))
            {
                return Some(key.to_string());
            }
        }

        request.headers.get("x-api-key").cloned()
    }

    fn identity(role: Role) -> Identity {
        let user_id = match role {
            Role::Admin => "admin_key",
            Role::User => "user_key",
        };
        Identity {
            user_id: user_id.to_string(),
            method: "api_key".to_string(),
            role,
        }
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided_key = self
            .extract_key(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(provided_key.as_bytes(), self.admin_key.as_bytes()) {
            return Ok(Self::identity(Role::Admin));
        }

        if let Some(ref user_key) = self.user_key {
            if constant_time_eq(provided_key.as_bytes(), user_key.as_bytes()) {
                return Ok(Self::identity(Role::User));
            }
        }

        Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
