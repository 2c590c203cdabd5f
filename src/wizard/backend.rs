use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::model::InstallationConfig;
use crate::config::BackendConfig;

/// Terminal outcome of one backend invocation. Exactly one of these is
/// delivered per launch, strictly after all captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResult {
    Success,
    Failed {
        /// None when the process could not even be started
        exit_code: Option<i32>,
        message: String,
    },
    CrashedOrUnreachable {
        message: String,
    },
}

impl BackendResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BackendResult::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug)]
pub enum BackendEvent {
    Line { stream: OutputStream, text: String },
    Finished(BackendResult),
}

/// One commit attempt: the frozen snapshot, the output captured so far, and
/// eventually a terminal result. Never reused; a retry creates a new one.
#[derive(Debug)]
pub struct BackendInvocation {
    snapshot: InstallationConfig,
    output: Vec<(OutputStream, String)>,
    result: Option<BackendResult>,
    cancel: Option<oneshot::Sender<()>>,
}

impl BackendInvocation {
    fn new(snapshot: InstallationConfig, cancel: Option<oneshot::Sender<()>>) -> Self {
        Self {
            snapshot,
            output: Vec::new(),
            result: None,
            cancel,
        }
    }

    pub fn snapshot(&self) -> &InstallationConfig {
        &self.snapshot
    }

    pub fn output(&self) -> &[(OutputStream, String)] {
        &self.output
    }

    pub fn result(&self) -> Option<&BackendResult> {
        self.result.as_ref()
    }

    pub fn record_line(&mut self, stream: OutputStream, text: String) {
        self.output.push((stream, text));
    }

    pub fn finish(&mut self, result: BackendResult) {
        if self.result.is_none() {
            self.result = Some(result);
        }
    }

    /// Ask the supervisor to stop the backend. Returns false when the
    /// invocation already finished or cancellation was already requested.
    pub fn request_cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Last captured stderr line, falling back to the last stdout line.
    /// This is what the error page shows next to the exit code.
    pub fn diagnostic(&self) -> Option<&str> {
        self.output
            .iter()
            .rev()
            .find(|(stream, _)| *stream == OutputStream::Stderr)
            .or_else(|| self.output.last())
            .map(|(_, text)| text.as_str())
    }
}

/// Launches and supervises the privileged installation backend. Holds no
/// per-invocation state; every launch yields a fresh BackendInvocation.
#[derive(Debug, Clone)]
pub struct BackendRunner {
    program: String,
    base_args: Vec<String>,
    grace_period: Duration,
}

impl BackendRunner {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            program: config.program.clone(),
            base_args: config.args.clone(),
            grace_period: Duration::from_secs(config.grace_period_secs),
        }
    }

    /// Harmless stand-in used in dry-run mode: prints the phases a real
    /// backend would go through and exits 0.
    pub fn demo() -> Self {
        let script = "echo 'Creating partitions'; sleep 1; \
                      echo 'Creating filesystem'; sleep 1; \
                      echo 'Copying system image'; sleep 2; \
                      echo 'Configuring user account'; sleep 1; \
                      echo 'Installation complete'";
        Self {
            program: "/bin/sh".to_string(),
            base_args: vec!["-c".to_string(), script.to_string(), "demo-backend".to_string()],
            grace_period: Duration::from_secs(2),
        }
    }

    /// The single translation point from typed configuration to backend
    /// arguments: one flag/value pair per field, in a fixed order.
    pub fn build_args(&self, snapshot: &InstallationConfig) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "-d".to_string(),
            snapshot.target_disk.clone(),
            "-f".to_string(),
            snapshot.filesystem.token().to_string(),
            "-s".to_string(),
            snapshot.swap_mib.to_string(),
            "-u".to_string(),
            snapshot.username.clone(),
            "-A".to_string(),
            bool_arg(snapshot.auto_login),
            "-L".to_string(),
            bool_arg(snapshot.lenovo_fix),
        ]);
        args
    }

    /// Start the backend for the given frozen snapshot. The returned
    /// receiver yields output lines in per-stream emission order, then
    /// exactly one Finished event. A spawn failure resolves to an
    /// immediate Failed without ever reaching a running state.
    pub fn launch(
        &self,
        snapshot: InstallationConfig,
    ) -> (BackendInvocation, mpsc::UnboundedReceiver<BackendEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let args = self.build_args(&snapshot);
        info!("Launching backend: {} {:?}", self.program, args);

        let mut child = match Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let message = format!("Couldn't start backend '{}': {}", self.program, e);
                warn!("{message}");
                let _ = tx.send(BackendEvent::Finished(BackendResult::Failed {
                    exit_code: None,
                    message,
                }));
                return (BackendInvocation::new(snapshot, None), rx);
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_task = tokio::spawn(forward_lines(stdout, OutputStream::Stdout, tx.clone()));
        let err_task = tokio::spawn(forward_lines(stderr, OutputStream::Stderr, tx.clone()));

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        let pid = child.id();
        let grace = self.grace_period;

        tokio::spawn(async move {
            let result = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => match status.code() {
                        Some(0) => BackendResult::Success,
                        Some(code) => BackendResult::Failed {
                            exit_code: Some(code),
                            message: format!("Backend exited with code {code}"),
                        },
                        // No exit code means the process was taken down by
                        // a signal we did not send
                        None => BackendResult::CrashedOrUnreachable {
                            message: "Backend was terminated unexpectedly".to_string(),
                        },
                    },
                    Err(e) => BackendResult::CrashedOrUnreachable {
                        message: format!("Backend became unreachable: {e}"),
                    },
                },
                _ = &mut cancel_rx => {
                    terminate(&mut child, pid, grace).await;
                    BackendResult::CrashedOrUnreachable {
                        message: "Installation was cancelled before completion".to_string(),
                    }
                }
            };

            // The pipes close once the process is gone; joining the readers
            // here guarantees every Line event precedes the terminal result.
            let _ = out_task.await;
            let _ = err_task.await;

            info!("Backend finished: {:?}", result);
            let _ = tx.send(BackendEvent::Finished(result));
        });

        (BackendInvocation::new(snapshot, Some(cancel_tx)), rx)
    }
}

async fn forward_lines<R>(
    pipe: Option<R>,
    stream: OutputStream,
    tx: mpsc::UnboundedSender<BackendEvent>,
) where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else { return };
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(text)) = lines.next_line().await {
        if tx.send(BackendEvent::Line { stream, text }).is_err() {
            break;
        }
    }
}

/// Graceful stop: SIGTERM, a bounded grace period, then SIGKILL.
async fn terminate(child: &mut Child, pid: Option<u32>, grace: Duration) {
    if let Some(pid) = pid {
        let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        if tokio::time::timeout(grace, child.wait()).await.is_ok() {
            return;
        }
        warn!("Backend ignored SIGTERM, killing it");
    }
    let _ = child.kill().await;
}

fn bool_arg(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::model::FsType;

    fn snapshot() -> InstallationConfig {
        InstallationConfig {
            target_disk: "/dev/da0".to_string(),
            filesystem: FsType::Ufs,
            swap_mib: 2048,
            username: "alice".to_string(),
            auto_login: false,
            lenovo_fix: false,
        }
    }

    fn script_runner(script: &str) -> BackendRunner {
        BackendRunner {
            program: "/bin/sh".to_string(),
            base_args: vec!["-c".to_string(), script.to_string(), "backend".to_string()],
            grace_period: Duration::from_secs(1),
        }
    }

    /// Drain the event channel into the invocation, returning the terminal
    /// result the way the wizard consumes it.
    async fn supervise(
        invocation: &mut BackendInvocation,
        mut rx: mpsc::UnboundedReceiver<BackendEvent>,
    ) -> BackendResult {
        while let Some(event) = rx.recv().await {
            match event {
                BackendEvent::Line { stream, text } => invocation.record_line(stream, text),
                BackendEvent::Finished(result) => {
                    invocation.finish(result.clone());
                    return result;
                }
            }
        }
        panic!("channel closed without a terminal result");
    }

    #[test]
    fn args_map_one_flag_per_field() {
        let runner = BackendRunner::new(&BackendConfig::default());
        let mut config = snapshot();
        config.lenovo_fix = true;
        assert_eq!(
            runner.build_args(&config),
            vec![
                "-d", "/dev/da0", "-f", "ufs", "-s", "2048", "-u", "alice", "-A", "0", "-L", "1",
            ]
        );
        // Deterministic: same snapshot, same argv
        assert_eq!(runner.build_args(&config), runner.build_args(&config));
    }

    #[tokio::test]
    async fn exit_zero_is_success_and_output_order_is_preserved() {
        let runner = script_runner("echo first; echo second; echo third");
        let (mut invocation, rx) = runner.launch(snapshot());
        let result = supervise(&mut invocation, rx).await;

        assert_eq!(result, BackendResult::Success);
        let lines: Vec<&str> = invocation.output().iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn nonzero_exit_is_failed_with_code_and_diagnostic() {
        let runner = script_runner("echo 'partition table write failed' 1>&2; exit 1");
        let (mut invocation, rx) = runner.launch(snapshot());
        let result = supervise(&mut invocation, rx).await;

        assert_eq!(
            result,
            BackendResult::Failed {
                exit_code: Some(1),
                message: "Backend exited with code 1".to_string(),
            }
        );
        assert_eq!(invocation.diagnostic(), Some("partition table write failed"));
    }

    #[tokio::test]
    async fn missing_binary_fails_without_running() {
        let runner = BackendRunner {
            program: "/nonexistent/nomadbsd-install".to_string(),
            base_args: Vec::new(),
            grace_period: Duration::from_secs(1),
        };
        let (mut invocation, rx) = runner.launch(snapshot());
        let result = supervise(&mut invocation, rx).await;

        match result {
            BackendResult::Failed { exit_code, message } => {
                assert_eq!(exit_code, None);
                assert!(message.contains("Couldn't start backend"));
            }
            other => panic!("expected launch failure, got {other:?}"),
        }
        assert!(invocation.output().is_empty());
        // There is no process to cancel
        assert!(!invocation.request_cancel());
    }

    #[tokio::test]
    async fn external_kill_is_crashed_or_unreachable() {
        let runner = script_runner("echo started; kill -9 $$");
        let (mut invocation, rx) = runner.launch(snapshot());
        let result = supervise(&mut invocation, rx).await;

        assert!(matches!(result, BackendResult::CrashedOrUnreachable { .. }));
        assert_eq!(invocation.output(), &[(OutputStream::Stdout, "started".to_string())]);
    }

    #[tokio::test]
    async fn cancellation_terminates_and_reports_crashed() {
        let runner = script_runner("echo running; exec sleep 30");
        let (mut invocation, mut rx) = runner.launch(snapshot());

        // Wait for the first line so the process is known to be up
        match rx.recv().await {
            Some(BackendEvent::Line { text, .. }) => assert_eq!(text, "running"),
            other => panic!("expected a line first, got {other:?}"),
        }

        assert!(invocation.request_cancel());
        // Second request is a no-op
        assert!(!invocation.request_cancel());

        let result = supervise(&mut invocation, rx).await;
        match result {
            BackendResult::CrashedOrUnreachable { message } => {
                assert!(message.contains("cancelled"));
            }
            other => panic!("expected cancellation result, got {other:?}"),
        }
    }
}
