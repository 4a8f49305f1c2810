//! Release command handler
//!
//! Drives the whole flow: clone, tag resolution, build, device
//! authorization, duplicate-release check, release creation.

use tracing::info;

use crate::cli::auth::{authorize_device, resolve_client_id};
use crate::cli::commands::ReleaseArgs;
use crate::core::build::{BuildExecutor, CommandBuildExecutor, DEFAULT_BUILD_TARGET};
use crate::core::config::Config;
use crate::core::git::GitRepository;
use crate::core::prompt::TerminalPrompter;
use crate::core::repository::RepoLocator;
use crate::core::tags::{self, TagOptions, TagPlan};
use crate::error::{GitrelError, Result};
use crate::github::release::{ReleasePublisher, ReleaseRequest};

/// Handle the release command
pub async fn handle_release(args: ReleaseArgs) -> Result<()> {
    let config = Config::load()?;
    let locator = RepoLocator::parse(&args.repository)?;

    // clone into a scratch directory, cleaned up on drop
    let workdir = tempfile::Builder::new().prefix("gitrel-").tempdir()?;
    info!(repository = %locator.full_name(), dir = %workdir.path().display(), "cloning");
    println!("Cloning {}...", locator.full_name());
    let repo = GitRepository::clone_into(&locator.url, workdir.path(), args.branch.as_deref())?;

    // decide on the tag before any network authentication starts
    let tag_options = TagOptions {
        tag: args.tag.clone(),
        commitish: args.commitish.clone(),
        branch: args.branch.clone(),
        message: args.message.clone(),
        force: args.force,
    };
    let mut prompter = TerminalPrompter::new(args.force);
    let plan = tags::resolve(&repo, &tag_options, &mut prompter)?;
    let target = tags::apply(&repo, &plan)?;
    repo.checkout_commit(target)?;

    match &plan {
        TagPlan::UseExisting { name, .. } => println!("Using existing tag {name} ({target})"),
        TagPlan::CreateNew { name, .. } => {
            println!("Created tag {name} at {target}");
            // the clone only lives until the end of the run; the tag
            // object has to reach the remote before the release refers
            // to it
            info!(tag = %name, "pushing tag to origin");
            repo.push_tag(name)?;
            println!("Pushed tag {name} to origin");
        }
    }

    if args.skip_build {
        info!("skipping build step");
    } else {
        let executor = CommandBuildExecutor::new(
            config.build_program.clone().unwrap_or_else(|| "make".to_string()),
        );
        let build_target = config
            .build_target
            .clone()
            .unwrap_or_else(|| DEFAULT_BUILD_TARGET.to_string());
        println!("Building artifacts...");
        executor.run_target(&build_target, workdir.path())?;
    }

    // authorize the device and obtain a one-shot access token
    println!("Authorizing device...");
    let token = authorize_device(resolve_client_id(args.client_id.clone(), &config)).await?;

    let publisher = ReleasePublisher::new(locator.owner.clone(), locator.name.clone())?;

    // a re-run after a partial failure must not duplicate the release
    info!(tag = %plan.tag_name(), "checking for an existing release");
    if publisher.find_by_tag(&token, plan.tag_name()).await?.is_some() {
        return Err(GitrelError::ReleaseExists(plan.tag_name().to_string()));
    }

    let request = ReleaseRequest {
        tag_name: plan.tag_name().to_string(),
        // only meaningful when the provider has to create the tag itself
        target_commitish: match &plan {
            TagPlan::UseExisting { .. } => None,
            TagPlan::CreateNew { .. } => Some(target.to_string()),
        },
        name: args.title.clone().unwrap_or_else(|| args.tag.clone()),
        body: args.message.clone().unwrap_or_else(|| plan.message().to_string()),
        draft: args.draft,
        prerelease: args.prerelease,
    };

    println!("Creating release...");
    let record = publisher.create(&token, &request).await?;

    println!();
    println!("✓ Release created: {}", record.html_url);
    if record.draft {
        println!("  (draft - publish it from the releases page)");
    }
    Ok(())
}
