use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator for single-user installs: every request is the anonymous
/// ADMIN, whatever credentials it carries.
///
/// Only selected by `method = "none"` in `[auth]`; there is no fallback to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    #[tokio::test]
    async fn test_anonymous_admin_without_headers() {
        let identity = NoneAuthenticator::new()
            .authenticate(&AuthRequest::default())
            .await
            .unwrap();

        assert_eq!(identity.user_id, "anonymous");
        assert_eq!(identity.method, "none");
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_credentials_are_ignored() {
        let request = AuthRequest::from_headers([("X-API-Key", "not-a-key")]);
        let identity = NoneAuthenticator.authenticate(&request).await.unwrap();
        assert!(identity.is_admin());
        assert_eq!(NoneAuthenticator::default().method_name(), "none");
    }
}
