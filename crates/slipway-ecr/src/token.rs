//! Token decoding and image reference synthesis
//!
//! ECR issues a base64-encoded `username:password` authorization token tied
//! to a proxy endpoint. The token lives only as long as the login attempt
//! that consumes it; nothing here is persisted.

use crate::error::{AuthError, Result};
use base64::Engine;

/// Ephemeral registry login derived from an authorization token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub username: String,
    pub password: String,
    /// Registry endpoint reported alongside the token (e.g. `https://<account>.dkr.ecr...`)
    pub endpoint: String,
}

impl AuthToken {
    /// Decode a base64 `username:password` token into an [`AuthToken`]
    pub fn from_authorization(token: &str, endpoint: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token)
            .map_err(|e| AuthError::MalformedToken(format!("base64 decode failed: {}", e)))?;

        let text = String::from_utf8(decoded)
            .map_err(|e| AuthError::MalformedToken(format!("invalid UTF-8: {}", e)))?;

        let (username, password) = text
            .split_once(':')
            .ok_or_else(|| AuthError::MalformedToken("missing ':' separator".to_string()))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

/// Extract the account id from a caller identity ARN
///
/// ARNs are colon-delimited (`arn:aws:iam::123456789012:user/ci`); the
/// account id sits in the fifth field.
pub fn account_id_from_arn(arn: &str) -> Result<String> {
    arn.split(':')
        .nth(4)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AuthError::MalformedArn(arn.to_string()))
}

/// Synthesize the fully qualified ECR image reference for a repository
pub fn registry_image(account_id: &str, region: &str, repo_name: &str) -> String {
    format!("{}.dkr.ecr.{}.amazonaws.com/{}", account_id, region, repo_name)
}
