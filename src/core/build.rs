//! External build tool invocation
//!
//! The build step runs a named target of the project's own build tool in
//! the cloned working directory; gitrel only cares about success or failure.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::{GitrelError, Result};

/// Build tool used when none is configured
const DEFAULT_BUILD_PROGRAM: &str = "make";

/// Build target used when none is configured
pub const DEFAULT_BUILD_TARGET: &str = "build";

/// Something that can run a named build target in a working directory
pub trait BuildExecutor {
    /// Run `target`; a non-zero exit is a failure
    fn run_target(&self, target: &str, working_dir: &Path) -> Result<()>;
}

/// Build executor that shells out to the build program
pub struct CommandBuildExecutor {
    program: String,
}

impl CommandBuildExecutor {
    /// Use a specific build program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandBuildExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_PROGRAM)
    }
}

impl BuildExecutor for CommandBuildExecutor {
    fn run_target(&self, target: &str, working_dir: &Path) -> Result<()> {
        info!(program = %self.program, %target, "building artifacts");

        let output = Command::new(&self.program)
            .arg(target)
            .current_dir(working_dir)
            .output()
            .map_err(|e| GitrelError::Build(format!("cannot run '{}': {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitrelError::Build(format!(
                "'{} {}' exited with {}: {}",
                self.program,
                target,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
