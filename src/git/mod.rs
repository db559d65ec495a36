use crate::process::Invocation;
use std::path::Path;
use url::Url;

const GIT: &str = "git";

/// Blobless clone of `remote` into `path`.
pub fn clone(remote: &Url, path: &Path) -> Invocation {
    Invocation::new(GIT)
        .args(["clone", "--quiet", "--filter=blob:none"])
        .arg(remote.as_str())
        .arg(path.display().to_string())
}

/// Drops uncommitted changes in the working copy.
pub fn restore(working_copy: &Path) -> Invocation {
    Invocation::new(GIT)
        .args(["restore", "."])
        .current_dir(working_copy)
}

pub fn checkout(working_copy: &Path, tag: &str) -> Invocation {
    Invocation::new(GIT)
        .args(["checkout", tag])
        .current_dir(working_copy)
}

pub fn apply(working_copy: &Path, patch: &Path) -> Invocation {
    Invocation::new(GIT)
        .arg("apply")
        .arg(patch.display().to_string())
        .current_dir(working_copy)
}
