use crate::config::{CommandLine, VersionConfig};
use crate::environment::{derive_environment, EnvPatch};
use crate::git;
use crate::layout::Layout;
use crate::process::{Invocation, Runner};
use crate::status::Status;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, info_span, Instrument};

pub mod artifact;

#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOptions {
    /// Strip proxy variables from the build environment.
    pub no_mirrors: bool,
    /// Point `JAVA_HOME` at `JAVA_HOME_<java>_X64`.
    pub select_jdk: bool,
}

/// Builds one version at a time inside the shared working copy.
pub struct Builder<'a, R: Runner + ?Sized> {
    runner: &'a R,
    layout: &'a Layout,
    options: BuildOptions,
    base_env: HashMap<OsString, OsString>,
}

impl<'a, R: Runner + ?Sized> Builder<'a, R> {
    pub fn new(runner: &'a R, layout: &'a Layout, options: BuildOptions) -> Self {
        Self {
            runner,
            layout,
            options,
            base_env: env::vars_os().collect(),
        }
    }

    /// Replaces the environment build commands are derived from.
    pub fn with_base_environment(mut self, base_env: HashMap<OsString, OsString>) -> Self {
        self.base_env = base_env;
        self
    }

    /// Errors are fatal for the whole batch; a version that merely fails to
    /// build returns [`Status::Failure`].
    pub async fn build(&self, version: &str) -> Result<Status> {
        self.build_version(version)
            .instrument(info_span!("build", version = %version))
            .await
    }

    async fn build_version(&self, version: &str) -> Result<Status> {
        let config_path = self.layout.get_version_config(version);
        let config = VersionConfig::load(&config_path).await?;

        info!("loaded {}", config_path.display());

        let working_copy = &self.layout.working_copy;

        self.run_required(&git::restore(working_copy))
            .await
            .context("failed to restore the working copy")?;

        self.run_required(&git::checkout(working_copy, &config.tag))
            .await
            .with_context(|| format!("failed to check out {}", config.tag))?;

        let mut status = self.apply_patches(version, &config).await;

        if status.is_success() {
            status = self.run_commands(&config).await;
        }

        if status.is_success() {
            status = artifact::collect(self.layout, &config.output).await;
        }

        if !status.is_success() {
            error!("cannot build {}", version);
        }

        Ok(status)
    }

    async fn run_required(&self, invocation: &Invocation) -> Result<()> {
        let code = self.runner.run(invocation).await?;

        if code != 0 {
            bail!("`{}` exited with code {}", invocation, code);
        }

        Ok(())
    }

    async fn apply_patches(&self, version: &str, config: &VersionConfig) -> Status {
        for patch in &config.patches {
            let path = self.layout.get_patch(version, patch);

            info!("applying {}", patch);

            match self
                .runner
                .run(&git::apply(&self.layout.working_copy, &path))
                .await
            {
                Ok(0) => (),
                Ok(code) => {
                    error!("failed to apply {} (exit code {})", patch, code);
                    return Status::Failure;
                }
                Err(err) => {
                    error!("failed to apply {}: {:#}", patch, err);
                    return Status::Failure;
                }
            }
        }

        Status::Success
    }

    async fn run_commands(&self, config: &VersionConfig) -> Status {
        let environment = match self.build_environment(config) {
            Ok(environment) => environment,
            Err(err) => {
                error!("{:#}", err);
                return Status::Failure;
            }
        };

        for command in &config.cmds {
            info!("running {} with java {}", command, config.java);

            let mut invocation = self.command_invocation(command);

            if let Some(environment) = &environment {
                invocation = invocation.envs(environment.clone());
            }

            match self.runner.run(&invocation).await {
                Ok(0) => (),
                Ok(code) => {
                    error!("failed while running {} (exit code {})", command, code);
                    return Status::Failure;
                }
                Err(err) => {
                    error!("failed while running {}: {:#}", command, err);
                    return Status::Failure;
                }
            }
        }

        Status::Success
    }

    /// `./gradlew` style programs are resolved against the working copy.
    fn command_invocation(&self, command: &CommandLine) -> Invocation {
        let program = Path::new(command.program());

        let program = if program.is_relative() && program.components().count() > 1 {
            let relative: PathBuf = program
                .components()
                .filter(|component| *component != Component::CurDir)
                .collect();

            self.layout.working_copy.join(relative).display().to_string()
        } else {
            command.program().to_string()
        };

        Invocation::new(program)
            .args(command.args())
            .current_dir(&self.layout.working_copy)
    }

    /// `None` when nothing needs changing and commands inherit the ambient
    /// environment.
    fn build_environment(
        &self,
        config: &VersionConfig,
    ) -> Result<Option<HashMap<OsString, OsString>>> {
        let mut patch = EnvPatch::new();

        if self.options.no_mirrors {
            patch.extend(&EnvPatch::no_mirrors());
        }

        patch.extend(&config.env_patch());

        if self.options.select_jdk {
            let key = format!("JAVA_HOME_{}_X64", config.java);

            let Some(java_home) = self.base_env.get(OsStr::new(&key)) else {
                bail!("cannot select java {}: {} is not set", config.java, key);
            };

            info!("using JAVA_HOME={}", java_home.to_string_lossy());

            patch.set("JAVA_HOME", java_home.clone());
        }

        if patch.is_empty() {
            return Ok(None);
        }

        Ok(Some(derive_environment(self.base_env.clone(), &patch)))
    }
}
