//! GitHub API integration module
//!
//! This module provides all GitHub-related functionality:
//! - Outbound request construction
//! - OAuth Device Flow authentication
//! - Release creation and lookup

pub mod device_auth;
pub mod release;
pub mod request;

pub use device_auth::{AccessToken, DeviceAuthConfig, DeviceAuthorization, DeviceFlowAuth};
pub use release::{ReleasePublisher, ReleaseRecord, ReleaseRequest};
