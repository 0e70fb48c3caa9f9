//! Programmatic interface to git, built on the git command-line tool.
//!
//! Operations spawn `git` as a subprocess rooted at the repository
//! path and parse its textual output into typed results. Nothing is
//! reimplemented: all repository state lives in git's own on-disk
//! format, and this crate only assembles argv arrays and reads text
//! back.
//!
//! ```no_run
//! use gitcall::Repository;
//!
//! # fn main() -> gitcall::error::GitResult<()> {
//! let repo = Repository::new("/path/to/project");
//! repo.add(&["src/lib.rs"])?;
//! if let Some(summary) = repo.commit("Add the thing")? {
//!     println!("committed {} on {}", summary.commit, summary.branch);
//! }
//! for entry in repo.log()? {
//!     println!("{} {}", entry.commit, entry.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod git;

// Re-export commonly used types for convenience
pub use error::{GitError, GitResult};
pub use git::{
    Branches, CommandOutput, CommitSummary, GitCommand, GitVersion, LogEntry, Remotes,
    Repository, Status,
};
