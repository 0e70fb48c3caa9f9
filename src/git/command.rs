use crate::error::{GitError, GitResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default per-invocation timeout before the child is killed
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of executing a git command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// A single git invocation: subcommand, flags, and trailing options,
/// executed with the working directory set to the repository path.
///
/// Arguments are always passed as an argv array; there is no shell
/// involved, so option values (commit messages, file paths) need no
/// quoting or escaping.
///
/// ```no_run
/// use gitcall::git::GitCommand;
///
/// let output = GitCommand::new("/path/to/repo", "rm")
///     .flags(["--cached"])
///     .options(["old.txt"])
///     .run();
/// ```
#[derive(Debug)]
pub struct GitCommand {
    program: String,
    working_dir: PathBuf,
    subcommand: String,
    flags: Vec<String>,
    options: Vec<String>,
    timeout: Duration,
}

impl GitCommand {
    /// Create a new invocation for the given working directory and subcommand.
    ///
    /// Multi-word subcommands ("remote add") are split into separate
    /// argv tokens.
    pub fn new<P: AsRef<Path>>(working_dir: P, subcommand: &str) -> Self {
        Self {
            program: "git".to_string(),
            working_dir: working_dir.as_ref().to_path_buf(),
            subcommand: subcommand.to_string(),
            flags: Vec::new(),
            options: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the binary to execute (defaults to "git")
    pub fn program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Fixed switches accompanying the subcommand, in order
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Trailing arguments (file lists, messages, branch names), in order
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Set a custom timeout for this invocation
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The full argument vector, excluding the program name
    fn argv(&self) -> Vec<&str> {
        self.subcommand
            .split_whitespace()
            .chain(self.flags.iter().map(String::as_str))
            .chain(self.options.iter().map(String::as_str))
            .collect()
    }

    /// Human-readable form of the invocation, used in errors and logs
    fn display(&self) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.argv());
        parts.join(" ")
    }

    /// Spawn the process, wait for it to exit (or kill it at the
    /// timeout), and capture its entire stdout/stderr into memory.
    ///
    /// A non-zero exit surfaces as `GitError::CommandFailed` with the
    /// raw stderr attached. stderr text on a successful exit is not an
    /// error; git writes informational notices there.
    pub fn run(&self) -> GitResult<CommandOutput> {
        let command = self.display();
        debug!(command = %command, "spawning git");

        let mut child = Command::new(&self.program)
            .args(self.argv())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GitError::LaunchFailed {
                command: command.clone(),
                source: e,
            })?;

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = self.wait_with_timeout(&mut child, &command)?;

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);
        let exit_code = status.code().unwrap_or(-1);
        let success = status.success();
        debug!(command = %command, exit_code, "git exited");

        if !success {
            return Err(GitError::CommandFailed {
                command,
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            success,
        })
    }

    /// Poll for exit, killing the child once the deadline passes
    fn wait_with_timeout(
        &self,
        child: &mut Child,
        command: &str,
    ) -> GitResult<std::process::ExitStatus> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if start.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GitError::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Drain a child pipe on a background thread so the child never blocks
/// on a full pipe buffer while we poll for exit.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut r| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = r.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).to_string()
}
