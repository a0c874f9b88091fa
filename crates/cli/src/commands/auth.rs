use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use jira_panel_auth::{shared_secret_key, token_key, AppCredentials, CredentialStore};
use jira_panel_config::{AppProfile, Config};
use jira_panel_output::{OutputRenderer, ProfileRow};
use url::Url;

use super::{shared_secret, SHARED_SECRET_ENV};

const DEFAULT_PROFILE: &str = "default";

#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Add or update a profile and store its secrets
    Login(LoginArgs),
    /// Remove stored secrets (and optionally the profile)
    Logout(LogoutArgs),
    /// List configured profiles
    List,
    /// Mint an app assertion for a profile and print it
    Token,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Jira site base URL (e.g. https://example.atlassian.net)
    #[arg(long)]
    pub base_url: String,
    /// Account email for the user API token
    #[arg(long)]
    pub email: Option<String>,
    /// User API token (prompted when omitted)
    #[arg(long, env = "JIRA_PANEL_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// App issuer claim; enables acting as the app
    #[arg(long)]
    pub app_issuer: Option<String>,
    /// App subject claim
    #[arg(long, requires = "app_issuer")]
    pub app_subject: Option<String>,
    /// App audience claim (defaults to the base URL)
    #[arg(long, requires = "app_issuer")]
    pub app_audience: Option<String>,
    /// App shared secret (prompted when an issuer is given)
    #[arg(long, env = SHARED_SECRET_ENV, hide_env_values = true)]
    pub shared_secret: Option<String>,
    /// Mark this profile as the default one
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LogoutArgs {
    /// Remove the profile from the config file as well
    #[arg(long)]
    pub remove_profile: bool,
}

/// Profile-scoped commands use the global `--profile`. Login falls back to
/// `default`; the others fall back to the configured default profile.
pub fn handle(
    command: AuthCommand,
    profile: Option<&str>,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
    renderer: &OutputRenderer,
) -> Result<()> {
    match command {
        AuthCommand::Login(args) => {
            let name = profile.unwrap_or(DEFAULT_PROFILE).to_string();
            login(name, args, config, config_path, store, renderer)
        }
        AuthCommand::Logout(args) => {
            let name = profile
                .or(config.default_profile.as_deref())
                .map(str::to_string)
                .context("No profile selected. Pass --profile.")?;
            logout(name, args, config, config_path, store, renderer)
        }
        AuthCommand::List => list_profiles(config, store, renderer),
        AuthCommand::Token => mint_token(profile, config, store),
    }
}

fn login(
    name: String,
    args: LoginArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
    renderer: &OutputRenderer,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow!("Profile name cannot be empty"));
    }

    let base_url = Url::parse(&args.base_url)
        .with_context(|| format!("Invalid Jira site URL: {}", args.base_url))?;

    let token = match args.token {
        Some(token) if !token.trim().is_empty() => token.trim().to_owned(),
        _ => prompt_secret("Enter API token (leave empty to skip): ")?,
    };

    let app = match args.app_issuer {
        Some(issuer) => {
            let secret = match args.shared_secret {
                Some(secret) if !secret.is_empty() => secret,
                _ => prompt_secret("Enter app shared secret: ")?,
            };
            let app = AppProfile {
                subject: args.app_subject.unwrap_or_else(|| issuer.clone()),
                issuer,
                audience: args.app_audience,
            };
            let audience = app
                .audience
                .clone()
                .unwrap_or_else(|| base_url.to_string());
            // Fail early on an unusable secret or blank claim.
            AppCredentials::new(&app.issuer, &app.subject, audience, secret.as_str())?;
            Some((app, secret))
        }
        None => None,
    };

    let entry = config.profiles.entry(name.clone()).or_default();
    entry.base_url = Some(base_url.to_string());
    if args.email.is_some() {
        entry.email = args.email.clone();
    }
    entry.api_token = None;

    if !token.is_empty() {
        store
            .set_secret(&token_key(&name), &token)
            .context("Failed to store API token")?;
    }
    if let Some((app, secret)) = app {
        entry.app = Some(app);
        store
            .set_secret(&shared_secret_key(&name), &secret)
            .context("Failed to store shared secret")?;
    }

    if args.default || config.default_profile.is_none() {
        config.default_profile = Some(name.clone());
    }

    config
        .save(config_path)
        .context("Unable to persist configuration file")?;

    tracing::info!(profile = %name, base_url = %base_url, "Profile saved");
    renderer.success(&format!("Saved profile '{}'", name));
    Ok(())
}

fn logout(
    name: String,
    args: LogoutArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    store: &CredentialStore,
    renderer: &OutputRenderer,
) -> Result<()> {
    if !config.profiles.contains_key(&name) {
        return Err(anyhow!("Profile '{}' does not exist", name));
    }

    store.delete_secret(&token_key(&name))?;
    store.delete_secret(&shared_secret_key(&name))?;

    if args.remove_profile {
        config.profiles.remove(&name);
        if config.default_profile.as_deref() == Some(name.as_str()) {
            config.default_profile = config.profiles.keys().next().cloned();
        }
        config
            .save(config_path)
            .context("Unable to persist configuration file")?;
    }

    tracing::info!(profile = %name, "Credentials removed");
    renderer.success(&format!("Removed secrets for '{}'", name));
    Ok(())
}

fn list_profiles(config: &Config, store: &CredentialStore, renderer: &OutputRenderer) -> Result<()> {
    let mut rows = Vec::new();
    for (name, profile) in &config.profiles {
        rows.push(ProfileRow {
            name: name.clone(),
            base_url: profile.base_url.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            has_token: profile.api_token.is_some()
                || store.get_secret(&token_key(name))?.is_some(),
            has_app: profile.app.is_some()
                && store.get_secret(&shared_secret_key(name))?.is_some(),
            is_default: config.default_profile.as_deref() == Some(name.as_str()),
        });
    }

    if rows.is_empty() {
        tracing::info!("No profiles configured yet. Use `jira-panel auth login` to add one.");
    }

    renderer.render_profiles(&rows)
}

fn mint_token(profile: Option<&str>, config: &Config, store: &CredentialStore) -> Result<()> {
    let (name, profile) = config
        .resolve_profile(profile)
        .context("No profile found. Use `jira-panel auth login` to create one.")?;
    let app = profile
        .app
        .as_ref()
        .with_context(|| format!("Profile '{name}' has no app section"))?;
    let audience = profile
        .app_audience()
        .with_context(|| format!("Profile '{name}' has no audience or base_url"))?;
    let secret = shared_secret(store, name)?.with_context(|| {
        format!("No shared secret for '{name}'. Set {SHARED_SECRET_ENV} or run `jira-panel auth login`")
    })?;

    let token = AppCredentials::new(&app.issuer, &app.subject, audience, secret)?.mint()?;
    println!("{token}");
    Ok(())
}

fn prompt_secret(prompt: &str) -> Result<String> {
    let value = rpassword::prompt_password(prompt).context("Failed to read secret from prompt")?;
    Ok(value.trim().to_owned())
}
