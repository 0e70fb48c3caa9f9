use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving the git command-line tool
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    /// The git binary could not be started at all (missing, not executable)
    #[error("Failed to launch '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// git ran but exited non-zero; stderr is passed through verbatim
    #[error("Command '{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Git version {0} is too old. Minimum required: 2.20")]
    UnsupportedVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;
