//! Registry authentication orchestration
//!
//! Turns static cloud credentials into a usable registry login in two calls:
//! identity resolution (for the account id) and token issuance. Neither the
//! credentials nor the token outlive the current action.

use crate::api::{CloudCredentials, RegistryAuthApi};
use crate::error::Result;
use crate::token::{AuthToken, account_id_from_arn};

/// Exchanges cloud credentials for a short-lived registry login
pub struct RegistryAuthenticator<'a> {
    api: &'a dyn RegistryAuthApi,
}

impl<'a> RegistryAuthenticator<'a> {
    pub fn new(api: &'a dyn RegistryAuthApi) -> Self {
        Self { api }
    }

    /// Resolve the account id behind the credentials via an identity lookup
    pub async fn resolve_account_id(&self, credentials: &CloudCredentials) -> Result<String> {
        let arn = self.api.caller_identity(credentials).await?;
        let account_id = account_id_from_arn(&arn)?;
        tracing::info!("The AWS account id from your credentials is: {}", account_id);
        Ok(account_id)
    }

    /// Issue and decode an authorization token for the account's registry
    pub async fn authenticate(
        &self,
        credentials: &CloudCredentials,
        registry_id: &str,
    ) -> Result<AuthToken> {
        tracing::info!("Getting AWS token to docker login");
        let authorization = self
            .api
            .authorization_token(credentials, registry_id)
            .await?;
        AuthToken::from_authorization(&authorization.token, &authorization.proxy_endpoint)
    }
}
