use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::wrappers::SplitStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

#[cfg(test)]
pub mod fake;

/// One external command: program, arguments, working directory and, when
/// set, the complete environment the child sees.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Option<HashMap<OsString, OsString>>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            cwd: None,
            env: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
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

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn envs(mut self, env: HashMap<OsString, OsString>) -> Self {
        self.env = Some(env);
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes invocations and reports their exit code.
///
/// `Err` means the command could not be started or waited on; a command
/// that ran and failed is `Ok` with a nonzero code.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<i32>;
}

/// Runs invocations as child processes, one at a time, logging their
/// output at debug level.
#[derive(Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl Runner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<i32> {
        let mut command = Command::new(&invocation.program);

        command.args(&invocation.args);

        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        if let Some(env) = &invocation.env {
            command.env_clear();
            command.envs(env);
        }

        debug!("running: {invocation}");

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| anyhow!("failed to spawn `{}`: {}", invocation.program, err))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            child.kill().await?;
            return Err(anyhow!("failed to capture output of `{}`", invocation.program));
        };

        // output is logged, never parsed: lines need not be UTF-8
        let stdout = SplitStream::new(BufReader::new(stdout).split(b'\n'));
        let stderr = SplitStream::new(BufReader::new(stderr).split(b'\n'));

        let mut stdio_merged = StreamExt::merge(stdout, stderr);

        while let Some(line) = stdio_merged.next().await {
            match line {
                Ok(line) => debug!("{}", String::from_utf8_lossy(&line).trim_end()),
                Err(err) => {
                    warn!("failed to read output of `{}`: {}", invocation.program, err);

                    // nobody drains the pipes any more; stop the child before returning
                    child.kill().await?;

                    return Err(anyhow!(
                        "lost output of `{}`: {}",
                        invocation.program,
                        err
                    ));
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|err| anyhow!("failed to wait for `{}`: {}", invocation.program, err))?;

        Ok(status.code().unwrap_or(-1))
    }
}
