use crate::builder::{BuildOptions, Builder};
use crate::layout::Layout;
use crate::process::Runner;
use crate::provision::ensure_repository;
use crate::status::Status;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::fs::read_dir;
use tracing::{error, info};

/// Per-version results in build order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    results: Vec<(String, Status)>,
}

impl Summary {
    pub fn push(&mut self, version: impl Into<String>, status: Status) {
        self.results.push((version.into(), status));
    }

    pub fn results(&self) -> &[(String, Status)] {
        &self.results
    }

    /// Bitwise-OR of every per-version code.
    pub fn code(&self) -> i32 {
        self.results
            .iter()
            .fold(0, |code, (_, status)| code | status.code())
    }

    pub fn log(&self) {
        for (version, status) in &self.results {
            match status {
                Status::Success => info!("{}: {}", version, status),
                Status::Failure => error!("{}: {}", version, status),
            }
        }
    }
}

/// Version identifiers are the names of the subdirectories of `patches`,
/// sorted.
pub async fn discover_versions(patches: &Path) -> Result<Vec<String>> {
    let mut entries = read_dir(patches)
        .await
        .with_context(|| format!("failed to read {}", patches.display()))?;

    let mut versions = vec![];

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => versions.push(name),
            Err(name) => bail!("version directory is not valid UTF-8: {:?}", name),
        }
    }

    versions.sort();

    Ok(versions)
}

/// Narrows `available` to `requested`, keeping sorted order. An empty
/// request selects everything.
pub fn select_versions(available: Vec<String>, requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() {
        return Ok(available);
    }

    for version in requested {
        if !available.contains(version) {
            bail!("no configuration for version {}", version);
        }
    }

    Ok(available
        .into_iter()
        .filter(|version| requested.contains(version))
        .collect())
}

/// Provisions the working copy once, then builds every selected version in
/// turn. Per-version failures are collected; fatal errors stop the run.
pub async fn run<R: Runner + ?Sized>(
    runner: &R,
    layout: &Layout,
    options: BuildOptions,
    requested: &[String],
) -> Result<Summary> {
    ensure_repository(runner, &layout.working_copy, &layout.remote).await;

    let versions = select_versions(discover_versions(&layout.patches).await?, requested)?;

    info!("building {} version(s): {:?}", versions.len(), versions);

    let builder = Builder::new(runner, layout, options);

    let mut summary = Summary::default();

    for version in &versions {
        let status = builder.build(version).await?;

        summary.push(version.as_str(), status);
    }

    summary.log();

    Ok(summary)
}
