use super::{Invocation, Runner};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
pub enum Reply {
    Exit(i32),
    SpawnError,
}

/// Records every invocation and answers with the first matching rule.
/// Commands without a rule exit 0.
#[derive(Debug, Default)]
pub struct FakeRunner {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies with `reply` to any invocation whose command line contains
    /// `needle`.
    pub fn on(mut self, needle: &str, reply: Reply) -> Self {
        self.rules.push((needle.to_string(), reply));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl Runner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<i32> {
        self.calls.lock().unwrap().push(invocation.clone());

        let line = invocation.to_string();

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, reply)| *reply)
            .unwrap_or(Reply::Exit(0));

        match reply {
            Reply::Exit(code) => Ok(code),
            Reply::SpawnError => bail!("failed to spawn `{}`", invocation.program),
        }
    }
}
