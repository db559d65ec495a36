use crate::layout::Layout;
use crate::status::Status;
use std::path::{Path, PathBuf};
use tokio::fs::{copy, create_dir_all};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Copies `output` (relative to the working copy) into the distributions
/// directory.
pub async fn collect(layout: &Layout, output: &Path) -> Status {
    let source = layout.get_working_copy_file(output);

    let candidates = find_candidates(&layout.working_copy, output);

    if !source.is_file() {
        report_missing_layout(&layout.working_copy, output);

        warn!(
            "found the following candidate files: {:?}",
            display_relative(&layout.working_copy, &candidates)
        );
        error!("cannot find artifact: {}", source.display());

        return Status::Failure;
    }

    debug!(
        "found the following candidate files: {:?}",
        display_relative(&layout.working_copy, &candidates)
    );

    let Some(file_name) = output.file_name().and_then(|name| name.to_str()) else {
        error!("artifact has no file name: {}", output.display());
        return Status::Failure;
    };

    if let Err(err) = create_dir_all(&layout.distributions).await {
        error!(
            "cannot create {}: {}",
            layout.distributions.display(),
            err
        );
        return Status::Failure;
    }

    let destination = layout.get_distribution(file_name);

    match copy(&source, &destination).await {
        Ok(_) => {
            info!("copied {} -> {}", source.display(), destination.display());
            Status::Success
        }
        Err(err) => {
            error!(
                "cannot copy {} -> {}: {}",
                source.display(),
                destination.display(),
                err
            );
            Status::Failure
        }
    }
}

/// Logs the first directory on the way to the artifact that does not exist.
fn report_missing_layout(working_copy: &Path, output: &Path) {
    if !working_copy.is_dir() {
        error!("cannot find working copy: {}", working_copy.display());
        return;
    }

    let Some(parent) = output.parent() else {
        return;
    };

    let mut dir = working_copy.to_path_buf();

    for component in parent.components() {
        dir.push(component);

        if !dir.is_dir() {
            error!("cannot find {}", dir.display());
            return;
        }
    }
}

/// Files that look like the expected artifact: anything inside a directory
/// matching the artifact's directory, and anything sharing its suffix
/// (`-bin.zip` for `gradle-6.1-bin.zip`).
pub fn find_candidates(working_copy: &Path, output: &Path) -> Vec<PathBuf> {
    let parent = output.parent().filter(|p| !p.as_os_str().is_empty());
    let suffix = output
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(artifact_suffix);

    let mut candidates: Vec<PathBuf> = WalkDir::new(working_copy)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let in_parent = match (parent, path.parent()) {
                (Some(expected), Some(actual)) => actual.ends_with(expected),
                _ => false,
            };

            let same_suffix = match (suffix, path.file_name().and_then(|n| n.to_str())) {
                (Some(suffix), Some(name)) => name.ends_with(suffix),
                _ => false,
            };

            in_parent || same_suffix
        })
        .collect();

    candidates.sort();
    candidates
}

fn artifact_suffix(file_name: &str) -> Option<&str> {
    file_name
        .rfind('-')
        .or_else(|| file_name.rfind('.'))
        .map(|index| &file_name[index..])
        .filter(|suffix| suffix.len() > 1)
}

fn display_relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| {
            path.strip_prefix(root)
                .unwrap_or(path)
                .display()
                .to_string()
        })
        .collect()
}
