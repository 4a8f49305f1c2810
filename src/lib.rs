//! gitrel - tag, build and publish a GitHub release with a single command
//!
//! This library clones a repository into a scratch directory, creates or
//! reuses an annotated tag, runs an external build target, authenticates
//! through the OAuth2 Device Authorization Flow and publishes a release
//! referencing the tag.

pub mod cli;
pub mod core;
pub mod error;
pub mod github;

pub use error::{GitrelError, Result};
