//! Local git repository operations
//!
//! Wrapper around git2 for the operations the release flow needs:
//! cloning into a scratch directory, tag lookup and creation, commit-ish
//! resolution and checkout.

use std::path::Path;
use std::process::Command;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{ObjectType, Oid, Repository, Signature};

use crate::error::{GitrelError, Result};

/// An existing annotated tag and the commit it points at
///
/// Once resolved, an existing tag is immutable for the rest of the run; the
/// tool never recreates or moves it.
#[derive(Debug, Clone)]
pub struct ExistingTag {
    /// Tag name
    pub name: String,
    /// Target commit id
    pub target: Oid,
}

/// Wrapper for local git repository operations
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Clone `url` into `dir`, optionally checking out a single branch
    pub fn clone_into(url: &str, dir: &Path, branch: Option<&str>) -> Result<Self> {
        let mut builder = RepoBuilder::new();
        if let Some(branch) = branch {
            builder.branch(branch);
        }
        let repo = builder.clone(url, dir)?;
        Ok(Self { repo })
    }

    /// Discover a git repository from the given path
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    /// Find a tag by exact name
    ///
    /// Scans every tag in the repository; a prefix match is never enough.
    /// Lightweight tags resolve to the commit they point at directly.
    pub fn find_tag(&self, name: &str) -> Result<Option<ExistingTag>> {
        let mut found = None;

        self.repo.tag_foreach(|oid, refname| {
            let tag_name = std::str::from_utf8(refname)
                .unwrap_or("")
                .strip_prefix("refs/tags/")
                .unwrap_or("");

            if tag_name == name {
                // annotated tags peel to their target; lightweight tags
                // already reference the commit
                let target = match self.repo.find_tag(oid) {
                    Ok(tag) => tag.target_id(),
                    Err(_) => oid,
                };
                found = Some(ExistingTag {
                    name: tag_name.to_string(),
                    target,
                });
            }
            true // keep scanning regardless
        })?;

        Ok(found)
    }

    /// Resolve a commit-ish (hash, branch, or tag name) to a commit id
    ///
    /// A commit-ish naming an existing tag peels to that tag's target.
    pub fn resolve_commitish(&self, commitish: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(commitish)
            .map_err(|_| GitrelError::UnresolvableCommitish(commitish.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitrelError::UnresolvableCommitish(commitish.to_string()))?;
        Ok(commit.id())
    }

    /// Resolve a branch name to its tip commit
    pub fn branch_tip(&self, branch: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(&format!("refs/heads/{branch}"))
            .or_else(|_| self.repo.revparse_single(&format!("refs/remotes/origin/{branch}")))
            .or_else(|_| self.repo.revparse_single(branch))
            .map_err(|_| GitrelError::UnresolvableCommitish(branch.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitrelError::UnresolvableCommitish(branch.to_string()))?;
        Ok(commit.id())
    }

    /// Resolve the repository HEAD to a commit id
    pub fn head_commit(&self) -> Result<Oid> {
        let head = self.repo.head().map_err(|_| GitrelError::NoHead)?;
        let commit = head.peel_to_commit().map_err(|_| GitrelError::NoHead)?;
        Ok(commit.id())
    }

    /// Create an annotated tag at `target`
    ///
    /// The tagger identity comes from the repository's configured
    /// user.name/user.email, falling back to a tool identity.
    pub fn create_annotated_tag(&self, name: &str, target: Oid, message: &str) -> Result<Oid> {
        let object = self
            .repo
            .find_object(target, Some(ObjectType::Commit))
            .map_err(|source| GitrelError::TagCreation {
                name: name.to_string(),
                source,
            })?;

        let tagger = self
            .repo
            .signature()
            .or_else(|_| Signature::now("gitrel", "gitrel@localhost"))?;

        self.repo
            .tag(name, &object, &tagger, message, false)
            .map_err(|source| GitrelError::TagCreation {
                name: name.to_string(),
                source,
            })
    }

    /// Push a tag ref to `origin`
    ///
    /// Runs the git binary so the user's regular credential setup (agent,
    /// credential helper) applies.
    pub fn push_tag(&self, name: &str) -> Result<()> {
        let workdir = self.repo.workdir().unwrap_or_else(|| self.repo.path());
        let output = Command::new("git")
            .args(["push", "origin", &format!("refs/tags/{name}")])
            .current_dir(workdir)
            .output()
            .map_err(|e| GitrelError::TagPush {
                name: name.to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitrelError::TagPush {
                name: name.to_string(),
                detail: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Check out `target` as a detached HEAD
    pub fn checkout_commit(&self, target: Oid) -> Result<()> {
        let object = self.repo.find_object(target, Some(ObjectType::Commit))?;
        self.repo
            .checkout_tree(&object, Some(CheckoutBuilder::new().force()))?;
        self.repo.set_head_detached(target)?;
        Ok(())
    }

    /// Tagger identity for display purposes
    pub fn tagger_identity(&self) -> Result<(String, String)> {
        let signature = self
            .repo
            .signature()
            .or_else(|_| Signature::now("gitrel", "gitrel@localhost"))?;
        Ok((
            signature.name().unwrap_or("gitrel").to_string(),
            signature.email().unwrap_or("gitrel@localhost").to_string(),
        ))
    }
}
