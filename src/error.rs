//! Custom error types for gitrel
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the gitrel application
#[derive(Error, Debug)]
pub enum GitrelError {
    /// Invalid repository URL format
    #[error("Cannot parse repository URL: {0}\n\n  → Expected format: https://github.com/owner/repo or git@github.com:owner/repo")]
    InvalidRepositoryUrl(String),

    /// Request construction failed (malformed URL or parameters)
    #[error("Cannot build request: {0}")]
    InvalidRequest(String),

    /// The device authorization request itself was rejected
    #[error("Failed to authorize device: {0}\n\n  → Check the configured OAuth client id.")]
    DeviceAuthInitiation(String),

    /// The user declined the authorization request
    #[error("Authorization was denied.\n\n  → Approve the device on the verification page to publish a release.")]
    AuthorizationDenied,

    /// The device code expired before the user authorized it
    #[error("Authorization expired - the device code is no longer valid.\n\n  → Run the command again and complete the process in time.")]
    AuthorizationExpired,

    /// The overall device flow deadline passed without a token
    #[error("Authorization timed out before the device was approved.\n\n  → Run the command again and enter the code promptly.")]
    AuthorizationTimedOut,

    /// The provider rejected the device code itself
    #[error("The authorization provider rejected the device code.\n\n  → This is a client bug; please file an issue.")]
    IncorrectDeviceCode,

    /// The provider rejected the client credentials
    #[error("The authorization provider rejected the OAuth client id.\n\n  → Check the `client_id` in your configuration.")]
    IncorrectClientCredentials,

    /// The provider does not support the device grant
    #[error("The authorization provider does not support the device code grant.\n\n  → This is a client bug; please file an issue.")]
    UnsupportedGrantType,

    /// Unexpected response shape from the provider
    #[error("Unexpected response from the provider: {0}")]
    Protocol(String),

    /// Non-success HTTP status from the provider
    #[error("The provider returned an error status: {0}")]
    Transport(String),

    /// Release API request failed
    #[error("Release request failed: {0}\n\n  → Check your internet connection and repository permissions.")]
    ReleaseApi(String),

    /// A release for the tag already exists
    #[error("A release for tag '{0}' already exists.\n\n  → Delete the existing release or pick a different tag.")]
    ReleaseExists(String),

    /// The supplied commit-ish cannot be resolved to a commit
    #[error("Cannot resolve '{0}' to a commit.\n\n  → Pass a full hash, a branch name, or an existing tag.")]
    UnresolvableCommitish(String),

    /// Repository has no usable HEAD to tag
    #[error("The repository has no usable HEAD.\n\n  → Pass an explicit commit with --commitish or a branch with --branch.")]
    NoHead,

    /// Annotated tag creation failed at the storage layer
    #[error("Cannot create tag '{name}': {source}")]
    TagCreation {
        /// Name of the tag that could not be created
        name: String,
        /// Underlying git failure
        #[source]
        source: git2::Error,
    },

    /// Tag push to the remote failed
    #[error("Cannot push tag '{name}' to the remote: {detail}\n\n  → Check your push access and git credentials.")]
    TagPush {
        /// Name of the tag that could not be pushed
        name: String,
        /// What git reported
        detail: String,
    },

    /// Tag message was empty after stripping comment lines
    #[error("Empty tag message - aborting tag creation.")]
    EmptyTagMessage,

    /// The build target failed
    #[error("Build failed: {0}")]
    Build(String),

    /// Editor invocation failed
    #[error("Cannot capture tag message from editor: {0}\n\n  → Set the EDITOR environment variable to a usable editor.")]
    Editor(String),

    /// Git operation error
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl From<toml::de::Error> for GitrelError {
    fn from(err: toml::de::Error) -> Self {
        GitrelError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for GitrelError {
    fn from(err: toml::ser::Error) -> Self {
        GitrelError::Toml(err.to_string())
    }
}

/// Result type alias using GitrelError
pub type Result<T> = std::result::Result<T, GitrelError>;
