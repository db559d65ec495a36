use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_REMOTE: &str = "https://github.com/gradle/gradle";
pub const CONFIG_FILE_NAME: &str = "patch.yml";

/// Where everything lives on disk. All paths are absolute.
#[derive(Clone, Debug)]
pub struct Layout {
    pub patches: PathBuf,
    pub working_copy: PathBuf,
    pub distributions: PathBuf,
    pub remote: Url,
}

impl Layout {
    /// Resolves relative paths against the current directory.
    pub fn new(
        patches: &Path,
        working_copy: &Path,
        distributions: &Path,
        remote: Url,
    ) -> Result<Self> {
        let cwd = env::current_dir()?;

        Ok(Self::with_root(&cwd, patches, working_copy, distributions, remote))
    }

    pub fn with_root(
        root: &Path,
        patches: &Path,
        working_copy: &Path,
        distributions: &Path,
        remote: Url,
    ) -> Self {
        Self {
            patches: root.join(patches),
            working_copy: root.join(working_copy),
            distributions: root.join(distributions),
            remote,
        }
    }

    pub fn get_version_dir(&self, version: &str) -> PathBuf {
        self.patches.join(version)
    }

    pub fn get_version_config(&self, version: &str) -> PathBuf {
        self.get_version_dir(version).join(CONFIG_FILE_NAME)
    }

    pub fn get_patch(&self, version: &str, patch: &str) -> PathBuf {
        self.get_version_dir(version).join(patch)
    }

    pub fn get_working_copy_file(&self, relative: &Path) -> PathBuf {
        self.working_copy.join(relative)
    }

    pub fn get_distribution(&self, file_name: &str) -> PathBuf {
        self.distributions.join(file_name)
    }
}
