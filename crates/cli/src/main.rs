mod commands;
mod panel;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use commands::attachments::AttachmentCommand;
use commands::{non_empty_env, shared_secret};
use commands::auth::{self, AuthCommand};
use commands::comments::CommentCommand;
use commands::issues::IssueCommand;
use commands::panel::PanelArgs;
use commands::search::SearchArgs;
use commands::worklogs::WorklogCommand;
use commands::CommandContext;
use jira_panel_api::retry::RetryConfig;
use jira_panel_api::{ApiClient, ApiError, AppCredentials, Identity, JiraClient};
use jira_panel_auth::{token_key, CredentialStore};
use jira_panel_config::Config;
use jira_panel_output::{OutputFormat, OutputRenderer};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "jira-panel", version, about = "Comments, worklogs, attachments and issue operations for Jira", long_about = None)]
struct Cli {
    /// Profile to use from config file
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Path to config file (defaults to ~/.jira-panel/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    /// Act as the user or as the app instead of the command's default
    #[arg(long = "as", value_enum, global = true)]
    identity: Option<IdentityChoice>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: PanelCommand,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum IdentityChoice {
    User,
    App,
}

#[derive(Subcommand, Debug, Clone)]
enum PanelCommand {
    /// View, add and delete issue comments
    #[command(subcommand)]
    Comments(CommentCommand),
    /// Add, update and delete worklogs
    #[command(subcommand)]
    Worklogs(WorklogCommand),
    /// Upload and delete attachments
    #[command(subcommand)]
    Attachments(AttachmentCommand),
    /// Create, update, delete, transition and assign issues
    #[command(subcommand)]
    Issues(IssueCommand),
    /// Search issues with JQL
    Search(SearchArgs),
    /// Interactive comment panel for one issue
    Panel(PanelArgs),
    /// Manage profiles and credentials
    #[command(subcommand)]
    Auth(AuthCommand),
}

impl PanelCommand {
    /// Comment and worklog activity shows up as the user's; issue lifecycle,
    /// search and signed uploads run as the app.
    fn default_identity(&self) -> IdentityChoice {
        match self {
            PanelCommand::Attachments(AttachmentCommand::Add { json: false, .. }) => {
                IdentityChoice::App
            }
            PanelCommand::Comments(_)
            | PanelCommand::Worklogs(_)
            | PanelCommand::Attachments(_)
            | PanelCommand::Panel(_)
            | PanelCommand::Auth(_) => IdentityChoice::User,
            PanelCommand::Issues(_) | PanelCommand::Search(_) => IdentityChoice::App,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.debug) {
        eprintln!("{err}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(hint) = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<ApiError>())
                .and_then(ApiError::suggestion)
            {
                eprintln!("Hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let mut config = Config::load(config_path.as_ref())?;
    let renderer = OutputRenderer::new(cli.output);
    let store = CredentialStore::new("jira-panel");

    let identity = cli
        .identity
        .unwrap_or_else(|| cli.command.default_identity());

    let command = match cli.command {
        PanelCommand::Auth(command) => {
            return auth::handle(
                command,
                cli.profile.as_deref(),
                &mut config,
                config_path.as_deref(),
                &store,
                &renderer,
            );
        }
        other => other,
    };

    let profile = resolve_active_profile(&config, cli.profile.as_deref(), &store)?;
    let ctx = CommandContext {
        client: profile.client(identity)?,
        renderer: &renderer,
    };

    match command {
        PanelCommand::Comments(command) => commands::comments::execute(command, &ctx).await,
        PanelCommand::Worklogs(command) => commands::worklogs::execute(command, &ctx).await,
        PanelCommand::Attachments(command) => {
            commands::attachments::execute(command, &ctx, profile.app.as_ref()).await
        }
        PanelCommand::Issues(command) => commands::issues::execute(command, &ctx).await,
        PanelCommand::Search(args) => commands::search::execute(args, &ctx).await,
        PanelCommand::Panel(args) => commands::panel::execute(args, &ctx).await,
        PanelCommand::Auth(_) => unreachable!("auth commands return early"),
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "info,jira_panel=debug,jira_panel_api=debug,jira_panel_auth=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}

struct ActiveProfile {
    name: String,
    base_url: String,
    email: Option<String>,
    token: Option<String>,
    app: Option<AppCredentials>,
    timeout: Option<Duration>,
    read_retries: usize,
}

impl ActiveProfile {
    fn client(&self, choice: IdentityChoice) -> Result<JiraClient> {
        let identity = match choice {
            IdentityChoice::User => {
                let token = self.token.clone().ok_or_else(|| {
                    anyhow!(
                        "No API token found for profile '{}'. Set {} or run `jira-panel auth login --profile {}`",
                        self.name,
                        token_env_var(&self.name),
                        self.name
                    )
                })?;
                match &self.email {
                    Some(email) => Identity::basic(email.clone(), token),
                    None => Identity::bearer(token),
                }
            }
            IdentityChoice::App => Identity::App(self.require_app()?.clone()),
        };

        let mut api = ApiClient::new(&self.base_url, identity)
            .with_context(|| format!("Invalid base_url for profile '{}'", self.name))?;
        if let Some(timeout) = self.timeout {
            api = api.with_timeout(timeout);
        }
        if self.read_retries > 0 {
            api = api.with_read_retries(RetryConfig::with_attempts(self.read_retries + 1));
        }

        tracing::debug!(profile = %self.name, identity = api.identity().label(), "Client ready");
        Ok(JiraClient::from_api(api))
    }

    fn require_app(&self) -> Result<&AppCredentials> {
        self.app.as_ref().ok_or_else(|| {
            anyhow!(
                "Profile '{}' has no app credentials. Add an `app` section and store the shared secret with `jira-panel auth login --app-issuer ...`",
                self.name
            )
        })
    }
}

fn token_env_var(profile: &str) -> String {
    format!("JIRA_PANEL_TOKEN_{}", profile.to_uppercase().replace('-', "_"))
}

fn resolve_active_profile(
    config: &Config,
    requested: Option<&str>,
    store: &CredentialStore,
) -> Result<ActiveProfile> {
    let (name, profile) = config
        .resolve_profile(requested)
        .ok_or_else(|| anyhow!("No profile configured. Run `jira-panel auth login` first."))?;

    let base_url = profile
        .base_url
        .clone()
        .ok_or_else(|| anyhow!("Profile '{name}' is missing a base_url."))?;

    // Profile env var, then generic env var, then credential store, then config.
    // The store is only read when neither env var is set.
    let token = match non_empty_env(&token_env_var(name))
        .or_else(|| non_empty_env("JIRA_PANEL_API_TOKEN"))
    {
        Some(token) => Some(token),
        None => store
            .get_secret(&token_key(name))?
            .or_else(|| profile.api_token.clone()),
    };

    let app = match &profile.app {
        Some(app) => {
            let secret = shared_secret(store, name)?;
            match (secret, profile.app_audience()) {
                (Some(secret), Some(audience)) => Some(
                    AppCredentials::new(&app.issuer, &app.subject, audience, secret)
                        .with_context(|| format!("Invalid app credentials in profile '{name}'"))?,
                ),
                _ => {
                    tracing::debug!(profile = name, "App section present but no shared secret");
                    None
                }
            }
        }
        None => None,
    };

    Ok(ActiveProfile {
        name: name.to_string(),
        base_url,
        email: profile.email.clone(),
        token,
        app,
        timeout: profile.timeout_secs.map(Duration::from_secs),
        read_retries: profile.read_retries,
    })
}
