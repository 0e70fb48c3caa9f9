use crate::error::{GitError, GitResult};
use crate::git::command::GitCommand;
use crate::git::parser::{
    self, Branches, CommitSummary, LogEntry, Status,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Log format string: one pseudo-JSON record per commit, each
/// terminated by a comma (including the last one, which the parser
/// strips)
const LOG_FORMAT: &str = "--pretty=format:{\"commit\": \"%H\",\"author\": \"%an <%ae>\",\"date\": \"%ad\",\"message\": \"%s\"},";

/// Handle to a directory that may be a git repository.
///
/// The handle itself holds no mutable state; every operation spawns a
/// fresh git process rooted at `path`, so distinct handles are safe to
/// use concurrently. A failed operation leaves the handle usable.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    name: String,
    is_repository: bool,
    timeout: Option<Duration>,
}

impl Repository {
    /// Create a handle for the given directory. Whether it looks like
    /// a repository (has a `.git` control subdirectory) is determined
    /// once, here; call `init` to make it one.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_repository = path.join(".git").exists();

        Self {
            path,
            name,
            is_repository,
            timeout: None,
        }
    }

    /// Find the enclosing repository by walking up from `start_path`
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            if current.join(".git").exists() {
                return Ok(Self::new(current));
            }
            if !current.pop() {
                return Err(GitError::NotARepository);
            }
        }
    }

    /// Apply a custom subprocess timeout to every operation on this handle
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last component of the repository path
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the directory had a `.git` subdirectory at construction
    pub fn is_repository(&self) -> bool {
        self.is_repository
    }

    fn cmd(&self, subcommand: &str) -> GitCommand {
        let cmd = GitCommand::new(&self.path, subcommand);
        match self.timeout {
            Some(timeout) => cmd.timeout(timeout),
            None => cmd,
        }
    }

    /// Initialize the directory as a git repository
    pub fn init(&self, flags: &[&str]) -> GitResult<()> {
        self.cmd("init").flags(flags.iter().copied()).run()?;
        Ok(())
    }

    /// Commit history, most recent first. Empty output (no commits
    /// after the parser is done) yields an empty sequence.
    pub fn log(&self) -> GitResult<Vec<LogEntry>> {
        let output = self.cmd("log").flags([LOG_FORMAT]).run()?;
        parser::parse_log(&output.stdout)
    }

    /// Working-tree status. Issues two invocations sequentially: the
    /// human-readable status block, then the untracked-file listing;
    /// the first error wins.
    pub fn status(&self) -> GitResult<Status> {
        let status = self.cmd("status").run()?;
        let untracked = self
            .cmd("ls-files")
            .flags(["--other", "--exclude-standard"])
            .run()?;
        parser::parse_status(&status.stdout, &untracked.stdout)
    }

    /// Stage the given files for commit
    pub fn add(&self, files: &[&str]) -> GitResult<()> {
        self.cmd("add").options(files.iter().copied()).run()?;
        Ok(())
    }

    /// Remove the given files from the index, leaving them on disk
    pub fn remove(&self, files: &[&str]) -> GitResult<()> {
        self.cmd("rm")
            .flags(["--cached"])
            .options(files.iter().copied())
            .run()?;
        Ok(())
    }

    /// Remove the given files from the staging area
    pub fn unstage(&self, files: &[&str]) -> GitResult<()> {
        self.cmd("reset")
            .flags(["HEAD", "--"])
            .options(files.iter().copied())
            .run()?;
        Ok(())
    }

    /// Commit the staged files. Returns `None` when git produced no
    /// acknowledgement (nothing to commit).
    pub fn commit(&self, message: &str) -> GitResult<Option<CommitSummary>> {
        let output = self.cmd("commit").flags(["-m"]).options([message]).run()?;
        parser::parse_commit(&output.stdout)
    }

    /// List branches: the current one plus all others in listed order
    pub fn branches(&self) -> GitResult<Branches> {
        let output = self.cmd("branch").run()?;
        parser::parse_branches(&output.stdout)
    }

    /// Create a new branch with the given name, without switching to it
    pub fn create_branch(&self, name: &str) -> GitResult<()> {
        self.cmd("branch").options([name]).run()?;
        Ok(())
    }

    /// Check out the given branch, then re-list branches so the caller
    /// sees the refreshed state
    pub fn checkout(&self, branch: &str) -> GitResult<Branches> {
        self.cmd("checkout").options([branch]).run()?;
        self.branches()
    }

    /// Merge the given branch into the current one
    pub fn merge(&self, branch: &str) -> GitResult<()> {
        self.cmd("merge").options([branch]).run()?;
        Ok(())
    }

    /// Remote management operations for this repository
    pub fn remotes(&self) -> Remotes<'_> {
        Remotes { repo: self }
    }
}

/// Remote management, attached to a `Repository` handle
#[derive(Debug)]
pub struct Remotes<'a> {
    repo: &'a Repository,
}

impl Remotes<'_> {
    /// Add a new remote
    pub fn add(&self, name: &str, url: &str) -> GitResult<()> {
        self.repo.cmd("remote add").options([name, url]).run()?;
        Ok(())
    }

    /// Change the URL of an existing remote
    pub fn set_url(&self, name: &str, url: &str) -> GitResult<()> {
        self.repo.cmd("remote set-url").options([name, url]).run()?;
        Ok(())
    }

    /// Remove the given remote
    pub fn remove(&self, name: &str) -> GitResult<()> {
        self.repo.cmd("remote rm").options([name]).run()?;
        Ok(())
    }

    /// Map of remote name to URL; fetch/push duplicates collapse to
    /// one entry
    pub fn list(&self) -> GitResult<BTreeMap<String, String>> {
        let output = self.repo.cmd("remote").flags(["-v"]).run()?;
        parser::parse_remotes(&output.stdout)
    }
}
