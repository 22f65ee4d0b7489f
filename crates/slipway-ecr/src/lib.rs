//! Slipway ECR Authentication
//!
//! This crate exchanges static AWS credentials for a short-lived ECR login:
//! caller identity lookup (STS), authorization token issuance (ECR), token
//! decoding, and synthesis of the fully qualified registry image reference.
//!
//! The cloud calls are abstracted behind [`RegistryAuthApi`] so the pipeline
//! can be tested with synthetic identity and token responses.

pub mod api;
pub mod authenticator;
pub mod error;
pub mod token;

pub use api::{AwsRegistryApi, CloudCredentials, RegistryAuthApi, RegistryAuthorization};
pub use authenticator::RegistryAuthenticator;
pub use error::{AuthError, Result};
pub use token::{AuthToken, account_id_from_arn, registry_image};
