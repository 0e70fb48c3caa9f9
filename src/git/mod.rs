pub mod command;
pub mod parser;
pub mod repository;
pub mod version;

// Re-export commonly used types
pub use command::{CommandOutput, GitCommand};
pub use parser::{
    Branches, CommitSummary, LogEntry, Status,
    parse_branches, parse_commit, parse_log, parse_remotes, parse_status,
};
pub use repository::{Remotes, Repository};
pub use version::GitVersion;
