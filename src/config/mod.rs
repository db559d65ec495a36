use crate::environment::EnvPatch;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::read_to_string;

/// A configured command, split into argument tokens when the
/// configuration is loaded. Never empty.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(try_from = "String")]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);

        let Some(program) = tokens.next() else {
            bail!("command line is empty");
        };

        Ok(Self {
            program,
            args: tokens.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl TryFrom<String> for CommandLine {
    type Error = anyhow::Error;

    fn try_from(line: String) -> Result<Self> {
        Self::parse(&line)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Contents of `<patches>/<version>/patch.yml`.
#[derive(Clone, Debug, Deserialize)]
pub struct VersionConfig {
    pub tag: String,
    /// JDK label, e.g. `8` or `11`. Only applied with `--select-jdk`.
    #[serde(deserialize_with = "label")]
    pub java: String,
    pub patches: Vec<String>,
    pub cmds: Vec<CommandLine>,
    pub output: PathBuf,
    #[serde(default)]
    pub env: BTreeMap<String, Option<String>>,
}

/// Accepts `java: 8` as well as `java: "8"`.
fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Number(serde_yaml::Number),
    }

    Ok(match Label::deserialize(deserializer)? {
        Label::Text(text) => text,
        Label::Number(number) => number.to_string(),
    })
}

impl VersionConfig {
    pub fn parse(data: &str) -> Result<Self> {
        let config: VersionConfig = serde_yaml::from_str(data)?;

        if config.output.as_os_str().is_empty() {
            bail!("`output` must not be empty");
        }

        if config.output.is_absolute() {
            bail!("`output` must be relative to the working copy");
        }

        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let data = read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::parse(&data).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn env_patch(&self) -> EnvPatch {
        EnvPatch::from(self.env.clone())
    }
}
