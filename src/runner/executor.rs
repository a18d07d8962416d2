//! Single command execution
//!
//! Runs one shell command to completion, racing process exit against the
//! configured timeout and an [`Interrupt`]. Whichever fires first decides the
//! [`CommandOutcome`]; the losing futures are dropped, and on timeout or
//! interrupt the whole process group is killed and the child reaped.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cli::Output;
use crate::utils::{format_duration, get_default_shell};

/// Exit code reported when the command did not exit on its own
pub const ABNORMAL_EXIT_CODE: i32 = -1;

/// Shell used to interpret command strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: String,
    flag: String,
}

impl Shell {
    pub fn new(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }

    /// `sh -c` on unix, `cmd /C` on windows
    pub fn system() -> Self {
        let flag = if cfg!(windows) { "/C" } else { "-c" };
        Self::new(get_default_shell(), flag)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, line: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(&self.flag).arg(line);
        command
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::system()
    }
}

/// Ctrl-C latch shared by every command of a run
///
/// Once triggered it stays triggered, so an interrupt that arrives between
/// two commands still stops the next one before it starts.
#[derive(Debug, Clone)]
pub struct Interrupt {
    triggered: watch::Receiver<bool>,
}

impl Interrupt {
    /// Listen for Ctrl-C for the rest of the process. Must be called inside
    /// a tokio runtime.
    pub fn ctrl_c() -> Self {
        let (tx, triggered) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::debug!("interrupt received");
                    let _ = tx.send(true);
                }
                Err(err) => tracing::debug!("unable to listen for Ctrl-C: {err}"),
            }
        });
        Self { triggered }
    }

    /// Latch triggered through the returned sender
    pub fn manual() -> (watch::Sender<bool>, Self) {
        let (tx, triggered) = watch::channel(false);
        (tx, Self { triggered })
    }

    pub fn is_triggered(&self) -> bool {
        *self.triggered.borrow()
    }

    async fn wait(&self) {
        let mut triggered = self.triggered.clone();
        if triggered.wait_for(|hit| *hit).await.is_err() {
            // Sender gone without firing
            std::future::pending::<()>().await;
        }
    }
}

/// How the command came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited on its own with a status code
    Exited,
    /// The process was killed by a signal it did not send itself
    Signaled,
    /// The shell could not be started
    SpawnFailed,
    /// The timeout fired first
    TimedOut(Duration),
    /// Ctrl-C arrived while the command was running
    Interrupted,
}

/// Result of running one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: String,
    pub success: bool,
    pub exit_code: i32,
    /// Captured stdout; `None` when output was streamed
    pub output: Option<String>,
    /// Captured stderr, or the reason for an abnormal termination
    pub error: Option<String>,
    pub duration: Duration,
    pub termination: Termination,
}

impl CommandOutcome {
    fn abnormal(command: &str, termination: Termination, reason: String, duration: Duration) -> Self {
        Self {
            command: command.to_string(),
            success: false,
            exit_code: ABNORMAL_EXIT_CODE,
            output: None,
            error: Some(reason),
            duration,
            termination,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.termination, Termination::TimedOut(_))
    }
}

struct Exited {
    status: io::Result<ExitStatus>,
    stdout: Option<String>,
    stderr: Option<String>,
}

enum Ending {
    Exited(Exited),
    TimedOut(Duration),
    Interrupted,
}

/// Runs commands through the shell, one at a time
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    shell: Shell,
    output: Output,
    interrupt: Option<Interrupt>,
}

impl CommandExecutor {
    pub fn new(output: Output) -> Self {
        Self {
            shell: Shell::system(),
            output,
            interrupt: None,
        }
    }

    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Attach a Ctrl-C listener unless an interrupt is already attached
    pub fn listening_for_ctrl_c(self) -> Self {
        if self.interrupt.is_some() {
            self
        } else {
            self.with_interrupt(Interrupt::ctrl_c())
        }
    }

    /// Run `command` and report a single outcome. A non-zero exit is a normal
    /// return with `success == false`, never an error.
    pub async fn run(&self, command: &str, timeout: Option<Duration>, verbose: bool) -> CommandOutcome {
        self.output.step(&format!("Running: {command}"));

        let outcome = self.execute(command, timeout, verbose).await;
        tracing::debug!(
            "command {:?} finished: {:?} exit={} in {:?}",
            command,
            outcome.termination,
            outcome.exit_code,
            outcome.duration
        );

        self.report(&outcome, verbose);
        outcome
    }

    async fn execute(&self, command: &str, timeout: Option<Duration>, verbose: bool) -> CommandOutcome {
        let started = Instant::now();

        if self.interrupt.as_ref().is_some_and(Interrupt::is_triggered) {
            return CommandOutcome::abnormal(
                command,
                Termination::Interrupted,
                "Command interrupted".to_string(),
                started.elapsed(),
            );
        }

        let mut cmd = self.shell.command(command);
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        if verbose {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        // Own process group, so a timeout can take down pipelines and subshells
        #[cfg(unix)]
        {
            cmd.process_group(0);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return CommandOutcome::abnormal(
                    command,
                    Termination::SpawnFailed,
                    format!("Failed to start {}: {err}", self.shell.program()),
                    started.elapsed(),
                );
            }
        };

        // The shell may be reaped while its background jobs still hold the
        // pipes, after which `child.id()` is gone
        let pid = child.id();

        let stdout = child.stdout.take().map(|pipe| tokio::spawn(collect(pipe)));
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(collect(pipe)));
        let readers: Vec<_> = stdout
            .iter()
            .chain(stderr.iter())
            .map(JoinHandle::abort_handle)
            .collect();

        let ending = tokio::select! {
            exited = wait_with_output(&mut child, stdout, stderr) => Ending::Exited(exited),
            limit = expire(timeout) => Ending::TimedOut(limit),
            _ = interrupted(self.interrupt.as_ref()) => Ending::Interrupted,
        };

        if !matches!(ending, Ending::Exited(Exited { status: Ok(_), .. })) {
            terminate(&mut child, pid).await;
            readers.iter().for_each(|reader| reader.abort());
        }

        match ending {
            Ending::Exited(Exited {
                status: Ok(status),
                stdout,
                stderr,
            }) => {
                let (exit_code, termination) = match status.code() {
                    Some(code) => (code, Termination::Exited),
                    None => (ABNORMAL_EXIT_CODE, Termination::Signaled),
                };
                CommandOutcome {
                    command: command.to_string(),
                    success: termination == Termination::Exited && exit_code == 0,
                    exit_code,
                    output: stdout,
                    error: stderr,
                    duration: started.elapsed(),
                    termination,
                }
            }
            Ending::Exited(Exited { status: Err(err), .. }) => {
                CommandOutcome::abnormal(
                    command,
                    Termination::Signaled,
                    format!("Failed to wait for command: {err}"),
                    started.elapsed(),
                )
            }
            Ending::TimedOut(limit) => {
                CommandOutcome::abnormal(
                    command,
                    Termination::TimedOut(limit),
                    format!("Command timed out after {}", format_duration(limit)),
                    started.elapsed(),
                )
            }
            Ending::Interrupted => {
                CommandOutcome::abnormal(
                    command,
                    Termination::Interrupted,
                    "Command interrupted".to_string(),
                    started.elapsed(),
                )
            }
        }
    }

    fn report(&self, outcome: &CommandOutcome, verbose: bool) {
        match outcome.termination {
            _ if outcome.success => {
                self.output.success(&format!(
                    "Completed in {}",
                    format_duration(outcome.duration)
                ));
            }
            Termination::Exited | Termination::Signaled => {
                self.output
                    .error(&format!("Failed with exit code {}", outcome.exit_code));
                if !verbose {
                    if let Some(stderr) = outcome.error.as_deref().filter(|s| !s.trim().is_empty()) {
                        self.output.captured(stderr);
                    }
                }
            }
            Termination::SpawnFailed | Termination::TimedOut(_) | Termination::Interrupted => {
                let reason = outcome.error.as_deref().unwrap_or("Command terminated abnormally");
                self.output.error(reason);
            }
        }
    }
}

async fn collect<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buffer = Vec::new();
    if let Err(err) = pipe.read_to_end(&mut buffer).await {
        tracing::debug!("stopped reading command output: {err}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

async fn join(task: Option<JoinHandle<String>>) -> Option<String> {
    match task {
        Some(task) => task.await.ok(),
        None => None,
    }
}

async fn wait_with_output(
    child: &mut Child,
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
) -> Exited {
    let status = child.wait().await;
    let (stdout, stderr) = tokio::join!(join(stdout), join(stderr));
    Exited {
        status,
        stdout,
        stderr,
    }
}

async fn expire(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(limit) => {
            tokio::time::sleep(limit).await;
            limit
        }
        None => std::future::pending().await,
    }
}

async fn interrupted(interrupt: Option<&Interrupt>) {
    match interrupt {
        Some(interrupt) => interrupt.wait().await,
        None => std::future::pending().await,
    }
}

async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            // Negative pid addresses the child's process group
            unsafe {
                libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
            }
        }
    }

    #[cfg(not(unix))]
    let _ = pid;

    if let Err(err) = child.kill().await {
        tracing::debug!("failed to kill command: {err}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn executor() -> CommandExecutor {
        CommandExecutor::new(Output::quiet())
    }

    #[tokio::test]
    async fn test_successful_command() {
        let outcome = executor().run("exit 0", None, false).await;
        assert!(outcome.success);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.termination, Termination::Exited);
        assert_eq!(outcome.command, "exit 0");
    }

    #[tokio::test]
    async fn test_failing_command_is_an_outcome() {
        let outcome = executor().run("exit 3", None, false).await;
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.termination, Termination::Exited);
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let outcome = executor()
            .run("echo checked; echo broken >&2; exit 1", None, false)
            .await;
        assert_eq!(outcome.output.as_deref(), Some("checked\n"));
        assert_eq!(outcome.error.as_deref(), Some("broken\n"));
    }

    #[tokio::test]
    async fn test_shell_features_are_honored() {
        let outcome = executor()
            .run("printf 'a\\nb\\nc\\n' | wc -l | tr -d ' ' && true", None, false)
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.output.as_deref().map(str::trim), Some("3"));
    }

    #[tokio::test]
    async fn test_verbose_does_not_capture() {
        let outcome = executor().run("true", None, true).await;
        assert!(outcome.success);
        assert_eq!(outcome.output, None);
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let started = Instant::now();
        let outcome = executor()
            .run("sleep 10", Some(Duration::from_millis(100)), false)
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!outcome.success);
        assert!(outcome.timed_out());
        assert_eq!(outcome.exit_code, ABNORMAL_EXIT_CODE);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Command timed out after 100ms")
        );
    }

    #[tokio::test]
    async fn test_timeout_reaches_subshells() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("still-running");
        let command = format!("(sleep 1 && touch '{}'); exit 0", marker.display());

        let outcome = executor()
            .run(&command, Some(Duration::from_millis(100)), false)
            .await;
        assert!(outcome.timed_out());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "subshell survived the timeout");
    }

    #[tokio::test]
    async fn test_timeout_reaches_background_jobs_after_shell_exit() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("still-running");
        // The shell exits at once but the job keeps the output pipes open
        let command = format!("(sleep 1 && touch '{}') & exit 0", marker.display());

        let outcome = executor()
            .run(&command, Some(Duration::from_millis(200)), false)
            .await;
        assert!(outcome.timed_out());
        assert_eq!(outcome.exit_code, ABNORMAL_EXIT_CODE);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background job survived the timeout");
    }

    #[tokio::test]
    async fn test_interrupt_kills_running_command() {
        let (trigger, interrupt) = Interrupt::manual();
        let executor = executor().with_interrupt(interrupt);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = trigger.send(true);
        });

        let started = Instant::now();
        let outcome = executor.run("sleep 10", None, false).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(outcome.termination, Termination::Interrupted);
        assert_eq!(outcome.exit_code, ABNORMAL_EXIT_CODE);
    }

    #[tokio::test]
    async fn test_dropped_interrupt_never_fires() {
        let (trigger, interrupt) = Interrupt::manual();
        drop(trigger);

        let outcome = executor()
            .with_interrupt(interrupt)
            .run("exit 0", None, false)
            .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_fast_command_beats_timeout() {
        let outcome = executor()
            .run("exit 0", Some(Duration::from_secs(5)), false)
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.termination, Termination::Exited);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let outcome = executor()
            .with_shell(Shell::new("/nonexistent/shell", "-c"))
            .run("exit 0", None, false)
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, ABNORMAL_EXIT_CODE);
        assert_eq!(outcome.termination, Termination::SpawnFailed);
        assert!(outcome.error.unwrap().starts_with("Failed to start /nonexistent/shell"));
    }

    #[tokio::test]
    async fn test_signal_is_abnormal() {
        let outcome = executor().run("kill -9 $$", None, false).await;
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, ABNORMAL_EXIT_CODE);
        assert_eq!(outcome.termination, Termination::Signaled);
    }
}
