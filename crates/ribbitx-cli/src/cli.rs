//! Command-line surface for administering an Artifactory instance.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use ribbitx_api_models::RepoClass;
use ribbitx_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::client::{ApiClient, ApiKey, AppContext, CliResult, ClientConfig, parse_url};
use crate::commands::repos::{
    handle_repo_create, handle_repo_delete, handle_repo_list, handle_repo_update,
};
use crate::commands::system::{handle_ping, handle_storage, handle_version};
use crate::commands::users::{handle_user_create, handle_user_delete, handle_user_list};
use crate::console::{Console, StdConsole};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BASE_URL: &str = "https://ribbitx.jfrog.io/artifactory/api";

/// Parses CLI arguments, executes the requested command, and reports any
/// failure on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("error: {err}");
        return 2;
    }

    let mut console = StdConsole;
    match execute(cli, &mut console).await {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            debug!(exit_code = err.exit_code(), error = %message, "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli, console: &mut dyn Console) -> CliResult<()> {
    let request_id = Uuid::new_v4().to_string();
    let api_key = cli.api_key.as_deref().and_then(ApiKey::new);
    if api_key.is_none() {
        warn!("no API key configured (set JFROG_API_KEY or --api-key); requests are anonymous");
    }

    let config = ClientConfig {
        base_url: cli.base_url,
        api_key,
        timeout: Duration::from_secs(cli.timeout),
        request_id,
    };
    let ctx = AppContext {
        api: ApiClient::new(&config)?,
        output: cli.output,
    };

    let span = info_span!(
        "command",
        command = command_label(&cli.command),
        request_id = %config.request_id
    );
    dispatch(&ctx, console, cli.command).instrument(span).await
}

async fn dispatch(ctx: &AppContext, console: &mut dyn Console, command: Command) -> CliResult<()> {
    match command {
        Command::Ping => handle_ping(ctx, console).await,
        Command::Version => handle_version(ctx, console).await,
        Command::Storage => handle_storage(ctx, console).await,
        Command::RepoList(args) => handle_repo_list(ctx, console, args).await,
        Command::RepoCreate(args) => handle_repo_create(ctx, console, args).await,
        Command::RepoUpdate(args) => handle_repo_update(ctx, console, args).await,
        Command::RepoDelete(args) => handle_repo_delete(ctx, console, args).await,
        Command::UserList => handle_user_list(ctx, console).await,
        Command::UserCreate(args) => handle_user_create(ctx, console, args).await,
        Command::UserDelete(args) => handle_user_delete(ctx, console, args).await,
    }
}

#[derive(Parser)]
#[command(
    name = "ribbitx",
    version,
    about = "Administrative CLI for an Artifactory instance"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "RIBBITX_BASE_URL",
        value_parser = parse_url,
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of the instance's REST API"
    )]
    base_url: Url,
    #[arg(
        long,
        global = true,
        env = "JFROG_API_KEY",
        hide_env_values = true,
        help = "API key sent in the X-JFrog-Art-Api header"
    )]
    api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "RIBBITX_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Per-request timeout in seconds"
    )]
    timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Plain,
        help = "Select output format for command results"
    )]
    output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "RIBBITX_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter directive; RUST_LOG takes precedence when set"
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        value_parser = parse_log_format,
        default_value = "pretty",
        help = "Log line format (pretty or json)"
    )]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the instance answers its health endpoint.
    Ping,
    /// Show the instance version and revision.
    Version,
    /// Show the file store summary.
    Storage,
    /// List repositories of one class.
    RepoList(RepoListArgs),
    /// Create a repository.
    RepoCreate(RepoCreateArgs),
    /// Replace a repository's public description.
    RepoUpdate(RepoUpdateArgs),
    /// Delete a repository after confirmation.
    RepoDelete(RepoDeleteArgs),
    /// List user names.
    UserList,
    /// Create a user.
    UserCreate(UserCreateArgs),
    /// Delete a user after confirmation.
    UserDelete(UserDeleteArgs),
}

#[derive(Args, Debug)]
pub(crate) struct RepoListArgs {
    /// Repository class to list (local, remote, virtual).
    #[arg(long = "type")]
    pub(crate) repo_type: Option<RepoClass>,
}

#[derive(Args, Debug)]
pub(crate) struct RepoCreateArgs {
    #[arg(long)]
    pub(crate) key: Option<String>,
    /// Repository class (local, remote, virtual).
    #[arg(long)]
    pub(crate) rclass: Option<RepoClass>,
    /// Package type, e.g. maven, npm, generic.
    #[arg(long)]
    pub(crate) package_type: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RepoUpdateArgs {
    #[arg(long)]
    pub(crate) key: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RepoDeleteArgs {
    /// Class used to list candidates when --key is absent.
    #[arg(long = "type")]
    pub(crate) repo_type: Option<RepoClass>,
    #[arg(long)]
    pub(crate) key: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
}

#[derive(Args, Debug)]
pub(crate) struct UserCreateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Initial password; prompted without echo when omitted.
    #[arg(long, env = "RIBBITX_USER_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct UserDeleteArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Plain,
    Json,
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    LogFormat::from_name(input)
        .ok_or_else(|| format!("unknown log format '{input}' (expected pretty or json)"))
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Ping => "ping",
        Command::Version => "version",
        Command::Storage => "storage",
        Command::RepoList(_) => "repo_list",
        Command::RepoCreate(_) => "repo_create",
        Command::RepoUpdate(_) => "repo_update",
        Command::RepoDelete(_) => "repo_delete",
        Command::UserList => "user_list",
        Command::UserCreate(_) => "user_create",
        Command::UserDelete(_) => "user_delete",
    }
}
