//! Tag resolution for the release flow
//!
//! Decides whether the release uses an existing tag or creates a new one,
//! and at which commit. Deciding and applying are separate steps so the
//! decision logic can be exercised against scratch repositories.

use git2::Oid;
use tracing::info;

use crate::core::git::GitRepository;
use crate::core::prompt::{strip_comments, Prompter, TAG_MESSAGE_TEMPLATE};
use crate::error::{GitrelError, Result};

/// Inputs for tag resolution
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    /// Tag name to create or reuse
    pub tag: String,
    /// Explicit commit-ish to tag, if any
    pub commitish: Option<String>,
    /// Branch whose tip to tag when no commit-ish is given
    pub branch: Option<String>,
    /// Preconfigured tag message; when absent the user's editor is opened
    pub message: Option<String>,
    /// Skip confirmation prompts
    pub force: bool,
}

/// The decision reached by [`resolve`]
#[derive(Debug)]
pub enum TagPlan {
    /// The tag exists; release its target commit, create nothing
    UseExisting {
        /// Tag name
        name: String,
        /// The existing tag's target commit
        target: Oid,
    },
    /// No such tag; create an annotated tag at `target`
    CreateNew {
        /// Tag name
        name: String,
        /// Commit to tag
        target: Oid,
        /// Annotation message, already stripped of comment lines
        message: String,
    },
}

impl TagPlan {
    /// The commit the release will reference
    pub fn target(&self) -> Oid {
        match self {
            TagPlan::UseExisting { target, .. } | TagPlan::CreateNew { target, .. } => *target,
        }
    }

    /// The tag name the release will reference
    pub fn tag_name(&self) -> &str {
        match self {
            TagPlan::UseExisting { name, .. } | TagPlan::CreateNew { name, .. } => name,
        }
    }

    /// Release body derived from the tag annotation, if one will be written
    pub fn message(&self) -> &str {
        match self {
            TagPlan::UseExisting { .. } => "",
            TagPlan::CreateNew { message, .. } => message,
        }
    }
}

/// Decide what to do about the requested tag
///
/// An existing tag is terminal for tag creation: its target is released
/// as-is, after confirmation unless `force` is set. Otherwise the target
/// commit is the commit-ish if supplied, the branch tip if a branch was
/// supplied, or HEAD.
pub fn resolve(
    repo: &GitRepository,
    opts: &TagOptions,
    prompter: &mut dyn Prompter,
) -> Result<TagPlan> {
    if let Some(existing) = repo.find_tag(&opts.tag)? {
        if !opts.force {
            let proceed = prompter.confirm(&format!(
                "Tag '{}' already exists. Continue using the existing tag's commit?",
                opts.tag
            ))?;
            if !proceed {
                return Err(GitrelError::Cancelled);
            }
        }
        info!(tag = %existing.name, target = %existing.target, "reusing existing tag");
        return Ok(TagPlan::UseExisting {
            name: existing.name,
            target: existing.target,
        });
    }

    let target = match (opts.commitish.as_deref(), opts.branch.as_deref()) {
        (Some(commitish), _) if !commitish.is_empty() => repo.resolve_commitish(commitish)?,
        (_, Some(branch)) if !branch.is_empty() => repo.branch_tip(branch)?,
        _ => repo.head_commit()?,
    };

    let message = match opts.message.as_deref() {
        Some(message) => strip_comments(message),
        None => strip_comments(&prompter.capture_message(TAG_MESSAGE_TEMPLATE)?),
    };
    if message.is_empty() {
        return Err(GitrelError::EmptyTagMessage);
    }

    info!(tag = %opts.tag, %target, "will create annotated tag");
    Ok(TagPlan::CreateNew {
        name: opts.tag.clone(),
        target,
        message,
    })
}

/// Carry out the plan, returning the commit the release references
pub fn apply(repo: &GitRepository, plan: &TagPlan) -> Result<Oid> {
    match plan {
        TagPlan::UseExisting { target, .. } => Ok(*target),
        TagPlan::CreateNew {
            name,
            target,
            message,
        } => {
            repo.create_annotated_tag(name, *target, message)?;
            Ok(*target)
        }
    }
}

#[cfg(test)]
mod tests {
    use git2::Repository;

    use super::*;
    use crate::core::prompt::MockPrompter;

    fn scratch_repo() -> (tempfile::TempDir, GitRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.test").unwrap();
        drop(config);

        {
            let signature = repo.signature().unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
                .unwrap();
        }

        let wrapped = GitRepository::discover(dir.path()).unwrap();
        (dir, wrapped)
    }

    fn opts(tag: &str) -> TagOptions {
        TagOptions {
            tag: tag.to_string(),
            ..TagOptions::default()
        }
    }

    #[test]
    fn test_existing_tag_is_reused_after_confirmation() {
        let (_dir, repo) = scratch_repo();
        let head = repo.head_commit().unwrap();
        repo.create_annotated_tag("v1.0", head, "first").unwrap();

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_| Ok(true));
        prompter.expect_capture_message().times(0);

        let plan = resolve(&repo, &opts("v1.0"), &mut prompter).unwrap();
        assert!(matches!(plan, TagPlan::UseExisting { .. }));
        assert_eq!(plan.target(), head);

        // applying the plan must not touch the tag
        apply(&repo, &plan).unwrap();
        assert_eq!(repo.find_tag("v1.0").unwrap().unwrap().target, head);
    }

    #[test]
    fn test_existing_tag_with_force_skips_confirmation() {
        let (_dir, repo) = scratch_repo();
        let head = repo.head_commit().unwrap();
        repo.create_annotated_tag("v1.0", head, "first").unwrap();

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(0);

        let mut options = opts("v1.0");
        options.force = true;

        let plan = resolve(&repo, &options, &mut prompter).unwrap();
        assert!(matches!(plan, TagPlan::UseExisting { .. }));
    }

    #[test]
    fn test_declining_existing_tag_cancels_the_run() {
        let (_dir, repo) = scratch_repo();
        let head = repo.head_commit().unwrap();
        repo.create_annotated_tag("v1.0", head, "first").unwrap();

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_| Ok(false));

        let err = resolve(&repo, &opts("v1.0"), &mut prompter).unwrap_err();
        assert!(matches!(err, GitrelError::Cancelled));
    }

    #[test]
    fn test_new_tag_defaults_to_head_with_configured_message() {
        let (_dir, repo) = scratch_repo();
        let head = repo.head_commit().unwrap();

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(0);
        prompter.expect_capture_message().times(0);

        let mut options = opts("v2.0");
        options.message = Some("Release v2.0".to_string());

        let plan = resolve(&repo, &options, &mut prompter).unwrap();
        match &plan {
            TagPlan::CreateNew {
                target, message, ..
            } => {
                assert_eq!(*target, head);
                assert_eq!(message, "Release v2.0");
            }
            other => panic!("expected CreateNew, got {:?}", other),
        }

        apply(&repo, &plan).unwrap();
        assert_eq!(repo.find_tag("v2.0").unwrap().unwrap().target, head);
    }

    #[test]
    fn test_commitish_naming_a_tag_peels_to_its_target() {
        let (_dir, repo) = scratch_repo();
        let head = repo.head_commit().unwrap();
        repo.create_annotated_tag("v1.0", head, "first").unwrap();

        let mut prompter = MockPrompter::new();
        let mut options = opts("v2.0");
        options.commitish = Some("v1.0".to_string());
        options.message = Some("Release v2.0".to_string());

        let plan = resolve(&repo, &options, &mut prompter).unwrap();
        assert!(matches!(plan, TagPlan::CreateNew { .. }));
        assert_eq!(plan.target(), head);
    }

    #[test]
    fn test_unresolvable_commitish_is_fatal() {
        let (_dir, repo) = scratch_repo();

        let mut prompter = MockPrompter::new();
        let mut options = opts("v2.0");
        options.commitish = Some("deadbeef123".to_string());
        options.message = Some("Release".to_string());

        let err = resolve(&repo, &options, &mut prompter).unwrap_err();
        assert!(matches!(err, GitrelError::UnresolvableCommitish(_)));
    }

    #[test]
    fn test_branch_tip_is_used_when_no_commitish() {
        let (dir, repo) = scratch_repo();
        let head = repo.head_commit().unwrap();

        let raw = Repository::open(dir.path()).unwrap();
        let commit = raw.find_commit(head).unwrap();
        raw.branch("topic", &commit, false).unwrap();

        let mut prompter = MockPrompter::new();
        let mut options = opts("v2.0");
        options.branch = Some("topic".to_string());
        options.message = Some("Release".to_string());

        let plan = resolve(&repo, &options, &mut prompter).unwrap();
        assert_eq!(plan.target(), head);
    }

    #[test]
    fn test_untouched_editor_template_aborts_tagging() {
        let (_dir, repo) = scratch_repo();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_capture_message()
            .times(1)
            .returning(|template| Ok(template.to_string()));

        let err = resolve(&repo, &opts("v2.0"), &mut prompter).unwrap_err();
        assert!(matches!(err, GitrelError::EmptyTagMessage));
        // nothing was written
        assert!(repo.find_tag("v2.0").unwrap().is_none());
    }

    #[test]
    fn test_editor_message_has_comments_stripped() {
        let (_dir, repo) = scratch_repo();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_capture_message()
            .returning(|_| Ok("Ship it\n# internal note\n".to_string()));

        let plan = resolve(&repo, &opts("v2.0"), &mut prompter).unwrap();
        assert_eq!(plan.message(), "Ship it");
    }
}
