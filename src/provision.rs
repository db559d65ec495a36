use crate::git;
use crate::process::Runner;
use std::path::Path;
use tracing::{error, info};
use url::Url;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provision {
    Cloned,
    Present,
    CloneFailed,
}

/// Clones `remote` into `path` unless a directory is already there.
///
/// A failed clone is only logged: the first build step against the missing
/// working copy reports the real problem.
pub async fn ensure_repository<R: Runner + ?Sized>(
    runner: &R,
    path: &Path,
    remote: &Url,
) -> Provision {
    if path.is_dir() {
        info!("repository already cloned: {}", path.display());
        return Provision::Present;
    }

    info!("cloning {} into {}", remote, path.display());

    match runner.run(&git::clone(remote, path)).await {
        Ok(0) => {
            info!("cloned repository: {}", path.display());
            Provision::Cloned
        }
        Ok(code) => {
            error!("cannot clone {} (exit code {})", remote, code);
            Provision::CloneFailed
        }
        Err(err) => {
            error!("cannot clone {}: {:#}", remote, err);
            Provision::CloneFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DEFAULT_REMOTE;
    use crate::process::fake::{FakeRunner, Reply};
    use tempfile::TempDir;

    fn remote() -> Url {
        Url::parse(DEFAULT_REMOTE).unwrap()
    }

    #[tokio::test]
    async fn test_clones_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gradle");
        let runner = FakeRunner::new();

        let result = ensure_repository(&runner, &path, &remote()).await;

        assert_eq!(result, Provision::Cloned);
        assert_eq!(runner.calls().len(), 1);
        assert!(runner.command_lines()[0].starts_with("git clone --quiet --filter=blob:none"));
    }

    #[tokio::test]
    async fn test_second_call_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gradle");
        let runner = FakeRunner::new();

        assert_eq!(ensure_repository(&runner, &path, &remote()).await, Provision::Cloned);

        // what a real clone leaves behind
        std::fs::create_dir(&path).unwrap();

        assert_eq!(ensure_repository(&runner, &path, &remote()).await, Provision::Present);
        assert_eq!(ensure_repository(&runner, &path, &remote()).await, Provision::Present);
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_clone_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gradle");

        let failing = FakeRunner::new().on("git clone", Reply::Exit(128));
        assert_eq!(
            ensure_repository(&failing, &path, &remote()).await,
            Provision::CloneFailed
        );

        let missing_git = FakeRunner::new().on("git clone", Reply::SpawnError);
        assert_eq!(
            ensure_repository(&missing_git, &path, &remote()).await,
            Provision::CloneFailed
        );
    }
}
