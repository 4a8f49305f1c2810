//! Core functionality for gitrel
//!
//! This module contains shared business logic including:
//! - Git repository operations
//! - Repository locator parsing
//! - Tag resolution
//! - Build execution
//! - User prompting and tag message capture
//! - Application configuration

pub mod build;
pub mod config;
pub mod git;
pub mod prompt;
pub mod repository;
pub mod tags;

pub use build::{BuildExecutor, CommandBuildExecutor};
pub use config::Config;
pub use git::GitRepository;
pub use prompt::{Prompter, TerminalPrompter};
pub use repository::RepoLocator;
pub use tags::{TagOptions, TagPlan};
