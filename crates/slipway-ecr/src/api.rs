//! Registry auth API abstraction
//!
//! The two cloud calls behind `push_to_registry` (caller identity lookup and
//! authorization token issuance) sit behind a trait so the pipeline can be
//! exercised with synthetic responses.

use crate::error::{AuthError, Result};
use async_trait::async_trait;

/// Static cloud credentials, taken verbatim from configuration
#[derive(Debug, Clone)]
pub struct CloudCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// Raw token-issuance response: the still-encoded token and its endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuthorization {
    /// Base64-encoded `username:password`
    pub token: String,
    /// Registry endpoint the token is valid for
    pub proxy_endpoint: String,
}

/// Cloud registry auth API
///
/// Credentials are passed per call; implementations build short-lived clients
/// from them and hold no state of their own.
#[async_trait]
pub trait RegistryAuthApi: Send + Sync {
    /// Look up the caller identity, returning its ARN
    async fn caller_identity(&self, credentials: &CloudCredentials) -> Result<String>;

    /// Issue an authorization token for the given registry id
    async fn authorization_token(
        &self,
        credentials: &CloudCredentials,
        registry_id: &str,
    ) -> Result<RegistryAuthorization>;
}

/// AWS STS/ECR implementation of [`RegistryAuthApi`]
#[derive(Debug, Default)]
pub struct AwsRegistryApi;

impl AwsRegistryApi {
    pub fn new() -> Self {
        Self
    }

    async fn sdk_config(credentials: &CloudCredentials) -> aws_config::SdkConfig {
        let provider = aws_sdk_sts::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "slipway",
        );
        aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .load()
            .await
    }
}

#[async_trait]
impl RegistryAuthApi for AwsRegistryApi {
    async fn caller_identity(&self, credentials: &CloudCredentials) -> Result<String> {
        let config = Self::sdk_config(credentials).await;
        let client = aws_sdk_sts::Client::new(&config);

        let identity = client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| AuthError::IdentityLookup(e.to_string()))?;

        identity
            .arn()
            .map(str::to_string)
            .ok_or_else(|| AuthError::IdentityLookup("response carried no ARN".to_string()))
    }

    async fn authorization_token(
        &self,
        credentials: &CloudCredentials,
        registry_id: &str,
    ) -> Result<RegistryAuthorization> {
        let config = Self::sdk_config(credentials).await;
        let client = aws_sdk_ecr::Client::new(&config);

        #[allow(deprecated)]
        let response = client
            .get_authorization_token()
            .registry_ids(registry_id)
            .send()
            .await
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;

        let data = response
            .authorization_data()
            .first()
            .ok_or(AuthError::MissingAuthorizationData)?;

        let token = data
            .authorization_token()
            .ok_or(AuthError::MissingAuthorizationData)?;
        let proxy_endpoint = data
            .proxy_endpoint()
            .ok_or(AuthError::MissingAuthorizationData)?;

        Ok(RegistryAuthorization {
            token: token.to_string(),
            proxy_endpoint: proxy_endpoint.to_string(),
        })
    }
}
