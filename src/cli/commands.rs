//! CLI command definitions using clap
//!
//! Defines the command structure for the `gitrel` CLI tool.

use clap::{Parser, Subcommand};

/// gitrel - tag, build and publish a GitHub release
///
/// Clones the repository into a scratch directory, creates or reuses an
/// annotated tag, runs the build target, authenticates via the OAuth
/// device flow and publishes the release.
#[derive(Parser, Debug)]
#[command(name = "gitrel", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose progress output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tag, build and publish a release
    Release(ReleaseArgs),

    /// Authenticate with GitHub
    Auth(AuthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Release Command
// ─────────────────────────────────────────────────────────────────────────────

/// Release command arguments
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Repository URL (https://github.com/owner/repo or git@github.com:owner/repo)
    #[arg(short, long)]
    pub repository: String,

    /// Tag to create or reuse for the release
    #[arg(short, long)]
    pub tag: String,

    /// Commit-ish to tag when the tag does not exist yet
    #[arg(short, long)]
    pub commitish: Option<String>,

    /// Branch to clone and tag from (defaults to the remote HEAD)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Tag annotation message; opens $EDITOR when omitted
    #[arg(short, long)]
    pub message: Option<String>,

    /// Release title (defaults to the tag name)
    #[arg(long)]
    pub title: Option<String>,

    /// Create the release as a draft
    #[arg(long)]
    pub draft: bool,

    /// Mark the release as a prerelease
    #[arg(long)]
    pub prerelease: bool,

    /// Answer yes to all confirmation prompts
    #[arg(short, long)]
    pub force: bool,

    /// Skip the artifact build step
    #[arg(long)]
    pub skip_build: bool,

    /// OAuth App client id override
    #[arg(long, env = "GITREL_CLIENT_ID")]
    pub client_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Run the device flow once to verify authentication works
    ///
    /// The obtained token is only held in memory and discarded on exit.
    Login {
        /// OAuth App client id override
        #[arg(long, env = "GITREL_CLIENT_ID")]
        client_id: Option<String>,
    },
}
