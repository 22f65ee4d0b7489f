//! Slipway Docker daemon capabilities
//!
//! This crate provides the container daemon operations used by the Slipway
//! pipeline: build context creation, image building, tagging, pushing and
//! registry login. The operations sit behind the [`ImageDaemon`] trait so
//! the pipeline can be driven by synthetic event streams in tests.

pub mod builder;
pub mod context;
pub mod daemon;
pub mod error;
pub mod event;
pub mod publisher;
pub mod reference;

pub use builder::ImageBuilder;
pub use context::ContextBuilder;
pub use daemon::{BuildRequest, DockerDaemon, ImageDaemon, RegistryCredentials};
pub use error::{DockerError, Result};
pub use event::{BuildEvent, EventReceiver, LoginStatus, PushEvent};
pub use publisher::ImagePublisher;
pub use reference::split_image_tag;
