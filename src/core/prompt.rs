//! User confirmation and tag message capture
//!
//! The release flow asks the user two kinds of questions: a y/n
//! confirmation and a free-form tag message captured through their editor.
//! Both sit behind [`Prompter`] so the tag resolution logic stays testable.

use std::env;
use std::io::{self, BufRead, Write};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{GitrelError, Result};

/// Editor used when $EDITOR is unset
const DEFAULT_EDITOR: &str = "vi";

/// Template written into the scratch file before the editor opens
pub const TAG_MESSAGE_TEMPLATE: &str = "\n\
# Please enter the tag message for your annotated tag. Lines starting\n\
# with '#' will be ignored, and an empty message aborts the tagging.\n";

static COMMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#.*\n?").expect("invalid comment-line pattern"));

/// Interactive capabilities the release flow needs from the user
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Ask a yes/no question
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Capture a tag message, starting from `template`
    ///
    /// Returns the raw captured text; comment stripping is the caller's
    /// concern.
    fn capture_message(&mut self, template: &str) -> Result<String>;
}

/// Prompter backed by the terminal and $EDITOR
///
/// With `force` set, every confirmation is answered yes without prompting.
pub struct TerminalPrompter {
    force: bool,
}

impl TerminalPrompter {
    /// Create a prompter; `force` suppresses all confirmation questions
    pub fn new(force: bool) -> Self {
        Self { force }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.force {
            return Ok(true);
        }

        let stdin = io::stdin();
        loop {
            print!("{prompt} [y/n]: ");
            io::stdout().flush()?;

            let mut response = String::new();
            stdin.lock().read_line(&mut response)?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            }
        }
    }

    fn capture_message(&mut self, template: &str) -> Result<String> {
        capture_via_editor(template)
    }
}

/// Open the user's editor on a scratch file pre-populated with `template`
/// and return whatever they saved
fn capture_via_editor(template: &str) -> Result<String> {
    let editor = preferred_editor();
    debug!(%editor, "capturing tag message via editor");

    let file = tempfile::Builder::new()
        .prefix("gitrel-")
        .suffix(".txt")
        .tempfile()?;
    std::fs::write(file.path(), template)?;

    let status = Command::new(&editor)
        .arg(file.path())
        .status()
        .map_err(|e| GitrelError::Editor(format!("cannot launch '{editor}': {e}")))?;

    if !status.success() {
        return Err(GitrelError::Editor(format!(
            "'{editor}' exited with {status}"
        )));
    }

    Ok(std::fs::read_to_string(file.path())?)
}

/// The user's editor as configured through $EDITOR
fn preferred_editor() -> String {
    env::var("EDITOR")
        .ok()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Remove lines beginning with '#' and surrounding whitespace
pub fn strip_comments(message: &str) -> String {
    COMMENT_LINE.replace_all(message, "").trim().to_string()
}
