use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app_tagger::cli::{run_publish_workflow, PublishRequest};
use app_tagger::config::{self, Config};
use app_tagger::git::Git2Workspace;
use app_tagger::host::GitHubClient;
use app_tagger::outputs::ActionOutputs;
use app_tagger::ui::{self, ConsoleReporter};

const LOG_ENV: &str = "APP_TAGGER_LOG";

#[derive(clap::Parser)]
#[command(
    name = "app-tagger",
    version,
    about = "Compute, create and push the next version tag of an application in a shared repository"
)]
struct Args {
    #[arg(long, env = "INPUT_REPO", help = "Repository as owner/name")]
    repo: String,

    #[arg(
        long,
        env = "INPUT_TOKEN",
        hide_env_values = true,
        help = "Token for the host API and HTTPS git access"
    )]
    token: Option<String>,

    #[arg(long, env = "INPUT_APPLICATION_NAME", help = "Application whose tags are versioned")]
    application_name: String,

    #[arg(
        long,
        env = "INPUT_RELEASE_TYPE",
        help = "Release stream such as beta or rc; empty means production"
    )]
    release_type: Option<String>,

    #[arg(long, env = "INPUT_CHANGE_TYPE", help = "major, minor or patch")]
    change_type: String,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Override the git remote used for fetch and push")]
    remote: Option<String>,

    #[arg(long, help = "Preview the next tag without creating or pushing it")]
    dry_run: bool,
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_error(&format!("Action failed: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut config: Config = config::load_config(args.config.as_deref())?;
    if let Some(remote) = args.remote {
        config.git.remote = remote;
    }

    let request = PublishRequest::from_inputs(
        &args.repo,
        &args.application_name,
        args.release_type.as_deref(),
        &args.change_type,
        &config,
    )?
    .dry_run(args.dry_run);

    let host = GitHubClient::new(&config.api.base_url, args.token.clone())
        .context("cannot create API client")?
        .with_page_size(config.api.page_size)
        .with_max_pages(config.api.max_pages);

    let workdir = std::env::current_dir().context("cannot determine working directory")?;
    let mut workspace = Git2Workspace::new(
        workdir,
        config.git.remote.clone(),
        config.git.clone_url(&request.repo),
        args.token,
    );

    let outcome = run_publish_workflow(&request, &host, &mut workspace, &ConsoleReporter)?;

    ActionOutputs::from(&outcome)
        .emit()
        .context("cannot write step outputs")?;
    Ok(())
}
