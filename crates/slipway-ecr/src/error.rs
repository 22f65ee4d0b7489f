//! Registry authentication error types

use thiserror::Error;

/// Errors raised while exchanging cloud credentials for a registry login
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identity lookup failed: {0}")]
    IdentityLookup(String),

    #[error("Malformed caller identity ARN: {0}")]
    MalformedArn(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Authorization data missing from token response")]
    MissingAuthorizationData,

    #[error("Malformed authorization token: {0}")]
    MalformedToken(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
