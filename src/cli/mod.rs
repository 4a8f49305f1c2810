//! CLI module for gitrel
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod auth;
pub mod commands;
pub mod release;

pub use commands::{Cli, Commands};
