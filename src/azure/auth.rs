//! Bearer tokens for ARM.
//!
//! [`ServicePrincipal`] wraps the `azure_identity` client-secret credential.
//! [`ArmClient`](super::ArmClient) only needs the [`TokenSource`] seam.

use crate::config::{Credentials, Settings};
use crate::error::{Error, Result};
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_core::Url;
use azure_identity::{ClientSecretCredential, TokenCredentialOptions};

/// Something that can hand out an ARM bearer token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

/// Client-secret credential for one tenant, scoped to the ARM endpoint.
pub struct ServicePrincipal {
    credential: ClientSecretCredential,
    scope: String,
}

impl ServicePrincipal {
    pub fn new(credentials: &Credentials, settings: &Settings) -> Result<Self> {
        let authority = Url::parse(&settings.authority_host).map_err(|e| {
            Error::config(format!(
                "invalid authority host {}: {e}",
                settings.authority_host
            ))
        })?;
        let credential = ClientSecretCredential::new(
            azure_core::new_http_client(),
            credentials.tenant_id.clone(),
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            TokenCredentialOptions::new(authority),
        );
        Ok(ServicePrincipal {
            credential,
            scope: settings.arm_scope(),
        })
    }

    /// Request a token once so bad credentials fail before anything is created.
    pub async fn authenticate(&self) -> Result<()> {
        self.bearer_token().await?;
        log::info!("Authenticated against {}", self.scope);
        Ok(())
    }
}

#[async_trait]
impl TokenSource for ServicePrincipal {
    async fn bearer_token(&self) -> Result<String> {
        let token = self
            .credential
            .get_token(&[self.scope.as_str()])
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;
        Ok(token.token.secret().to_string())
    }
}

/// Fixed token, for endpoints that do not check it.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_principal_rejects_bad_authority() {
        let creds = Credentials {
            client_id: "app".to_string(),
            client_secret: "secret".to_string(),
            tenant_id: "tenant".to_string(),
            subscription_id: "sub".to_string(),
        };
        let settings = Settings {
            authority_host: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            ServicePrincipal::new(&creds, &settings),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken("abc".to_string());
        assert_eq!(source.bearer_token().await.unwrap(), "abc");
    }
}
