use anyhow::Result;
use clap::Parser;
use retrobuild::batch;
use retrobuild::builder::BuildOptions;
use retrobuild::layout::{Layout, DEFAULT_REMOTE};
use retrobuild::logging;
use retrobuild::process::ProcessRunner;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use url::Url;

/// Builds historical Gradle releases from source.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Directory holding one configuration directory per version
    #[arg(default_value = "patches", long)]
    patches: PathBuf,

    /// Working copy of the source repository
    #[arg(default_value = "gradle", long)]
    source: PathBuf,

    /// Where collected artifacts are copied
    #[arg(default_value = "distributions", long)]
    distributions: PathBuf,

    /// Repository cloned when the working copy is missing
    #[arg(default_value = DEFAULT_REMOTE, long)]
    remote: Url,

    /// Drop proxy variables from the build environment
    #[arg(default_value_t = false, long)]
    no_mirrors: bool,

    /// Set JAVA_HOME from JAVA_HOME_<java>_X64
    #[arg(default_value_t = false, long)]
    select_jdk: bool,

    /// Versions to build; all configured versions when empty
    versions: Vec<String>,
}

async fn run(cli: Cli) -> Result<i32> {
    let layout = Layout::new(&cli.patches, &cli.source, &cli.distributions, cli.remote)?;

    let options = BuildOptions {
        no_mirrors: cli.no_mirrors,
        select_jdk: cli.select_jdk,
    };

    let summary = batch::run(&ProcessRunner, &layout, options, &cli.versions).await?;

    Ok(summary.code())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("failed to set up logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
