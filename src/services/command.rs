//! Item handler that runs an external command per work item
//!
//! The item is written as JSON to the command's stdin. Standard output is the
//! result payload: parsed as JSON when possible, otherwise kept as a string.
//! Exit codes follow the sysexits convention:
//!
//! | code | kind               |
//! |------|--------------------|
//! | 0    | success            |
//! | 65   | `VALIDATION_ERROR` |
//! | 69   | `SERVICE_ERROR`    |
//! | 75   | `NETWORK_ERROR`    |
//! | 76   | `RATE_LIMIT`       |
//! | 78   | `CONFIG_ERROR`     |
//! | else | `UNKNOWN_ERROR`    |

use crate::config::HandlerConfig;
use crate::core::item::WorkItem;
use crate::core::orchestrator::ItemHandler;
use crate::utils::error::{BatchError, ErrorKind, ItemFailure, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Map a process exit code to a failure kind
pub fn classify_exit(code: i32) -> ErrorKind {
    match code {
        65 => ErrorKind::Validation,
        69 => ErrorKind::Service,
        75 => ErrorKind::Network,
        76 => ErrorKind::RateLimit,
        78 => ErrorKind::Config,
        _ => ErrorKind::Unknown,
    }
}

/// Runs `program args...` once per item
#[derive(Debug, Clone)]
pub struct CommandHandler {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl CommandHandler {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            working_dir: None,
        }
    }

    pub fn from_config(config: &HandlerConfig) -> Result<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| BatchError::config("no handler command configured"))?;

        let mut handler = Self::new(program.clone()).args(args.iter().cloned());
        handler.timeout = config.timeout();
        handler.working_dir = config.working_dir.clone();
        Ok(handler)
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, item: &WorkItem) -> std::result::Result<Value, ItemFailure> {
        let input = serde_json::to_vec(item)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            ItemFailure::config(format!("failed to start '{}': {}", self.program, e))
        })?;

        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        if let Err(e) = written {
            // The command may legitimately exit without reading its input.
            debug!("Could not write item {} to '{}': {}", item.id, self.program, e);
        }
        let output = output?;

        match output.status.code() {
            Some(0) => Ok(parse_payload(&output.stdout)),
            Some(code) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let message = stderr
                    .lines()
                    .rev()
                    .find(|line| !line.trim().is_empty())
                    .map(|line| line.trim().to_string())
                    .unwrap_or_else(|| format!("'{}' exited with status {}", self.program, code));
                Err(ItemFailure::new(classify_exit(code), message))
            }
            None => Err(ItemFailure::unknown(format!(
                "'{}' was terminated by a signal",
                self.program
            ))),
        }
    }
}

fn parse_payload(stdout: &[u8]) -> Value {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl ItemHandler for CommandHandler {
    async fn handle(&self, item: &WorkItem) -> std::result::Result<Value, ItemFailure> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(item))
                .await
                .map_err(|_| {
                    ItemFailure::network(format!(
                        "'{}' timed out after {} ms",
                        self.program,
                        limit.as_millis()
                    ))
                })?,
            None => self.run(item).await,
        }
    }
}
