//! # External Runner Module / 外部运行器模块
//!
//! Invokes the media tool as a subprocess with both streams piped, hands every
//! emitted line to a per-stream callback, and measures wall-clock runtime.
//! Stream readers are driven concurrently with the wait so a chatty child can
//! never fill a pipe and deadlock.
//!
//! 以子进程方式调用媒体工具并通过管道捕获两个输出流，将每一行交给对应流的回调，
//! 并测量挂钟运行时间。流读取与等待并发进行，因此输出很多的子进程不会填满管道而死锁。

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::core::error::LaunchError;
use crate::core::models::{RunData, Termination};

/// Line callback type for one output stream.
/// 单个输出流的行回调类型。
pub type LineSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Runs the external tool. One instance is shared by every worker of a run.
/// 运行外部工具。一次运行中的所有工作者共享同一个实例。
#[derive(Debug, Clone)]
pub struct ExternalRunner {
    program: PathBuf,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl ExternalRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Kill the child and report [`Termination::TimedOut`] after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kill running children when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the tool with `command` as its argument string and blocks the
    /// calling task until the process ends.
    ///
    /// `command` is split with shell quoting rules but is never passed to a
    /// shell. A non-zero exit is not an error here; it is reported through
    /// [`RunData::termination`].
    ///
    /// 以 `command` 作为参数字符串运行工具，并阻塞调用任务直到进程结束。
    /// 非零退出码在此不是错误，而是通过 [`RunData::termination`] 报告。
    pub async fn run(
        &self,
        command: &str,
        on_stdout: LineSink<'_>,
        on_stderr: LineSink<'_>,
    ) -> Result<RunData, LaunchError> {
        let args =
            shlex::split(command).ok_or_else(|| LaunchError::BadCommandLine(command.to_string()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start_time = Instant::now();
        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or(LaunchError::Capture("stdout"))?;
        let stderr = child.stderr.take().ok_or(LaunchError::Capture("stderr"))?;

        let mut stdout_lines = Vec::new();
        let mut stderr_lines = Vec::new();

        let finished = {
            let capture = async {
                let (_, _, status) = tokio::join!(
                    pump_lines(stdout, on_stdout, &mut stdout_lines),
                    pump_lines(stderr, on_stderr, &mut stderr_lines),
                    child.wait()
                );
                status
            };
            let deadline = async {
                match self.timeout {
                    Some(limit) => tokio::time::sleep(limit).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                status = capture => Finished::Exited(status),
                _ = deadline => Finished::TimedOut,
                _ = self.cancel.cancelled() => Finished::Cancelled,
            }
        };

        let termination = match finished {
            Finished::Exited(Ok(status)) => termination_of(status),
            Finished::Exited(Err(_)) => Termination::Signalled,
            Finished::TimedOut => {
                let _ = child.kill().await;
                Termination::TimedOut
            }
            Finished::Cancelled => {
                let _ = child.kill().await;
                Termination::Cancelled
            }
        };
        let runtime = start_time.elapsed();

        Ok(RunData {
            termination,
            runtime,
            stdout: stdout_lines,
            stderr: stderr_lines,
        })
    }

    /// Starts the tool with no arguments and kills it straight away. Only a
    /// failure to start is reported; how the tool would have exited is not.
    ///
    /// 不带参数启动工具并立即终止。只报告启动失败，不关心工具本应如何退出。
    pub async fn check_launch(&self) -> Result<(), LaunchError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let _ = child.start_kill();
        let _ = child.wait().await;
        Ok(())
    }

    /// Convenience wrapper that only collects lines.
    pub async fn run_captured(&self, command: &str) -> Result<RunData, LaunchError> {
        self.run(command, &mut |_| {}, &mut |_| {}).await
    }
}

enum Finished {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

fn termination_of(status: ExitStatus) -> Termination {
    match status.code() {
        Some(code) => Termination::Exited(code),
        None => Termination::Signalled,
    }
}

/// Reads `reader` line by line until EOF, forwarding each line to `sink` and
/// keeping a copy in `captured`. Bytes that are not valid UTF-8 are replaced,
/// never dropped, so the pipe is drained to the end.
async fn pump_lines<R>(reader: R, sink: LineSink<'_>, captured: &mut Vec<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                sink(&line);
                captured.push(line);
            }
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
