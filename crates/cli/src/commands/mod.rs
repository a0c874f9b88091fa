pub mod attachments;
pub mod auth;
pub mod comments;
pub mod issues;
pub mod panel;
pub mod search;
pub mod worklogs;

use anyhow::{Context, Result};
use jira_panel_api::models::IssueRef;
use jira_panel_api::JiraClient;
use jira_panel_auth::{shared_secret_key, CredentialStore};
use jira_panel_output::OutputRenderer;

pub(crate) const SHARED_SECRET_ENV: &str = "JIRA_PANEL_SHARED_SECRET";

pub struct CommandContext<'a> {
    pub client: JiraClient,
    pub renderer: &'a OutputRenderer,
}

pub(crate) fn issue_ref(raw: &str) -> Result<IssueRef> {
    IssueRef::parse(raw).with_context(|| format!("Invalid issue reference '{raw}'"))
}

pub(crate) fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// App shared secret from the environment, else from the credential store.
/// The store is only read when the environment has nothing.
pub(crate) fn shared_secret(store: &CredentialStore, profile: &str) -> Result<Option<String>> {
    match non_empty_env(SHARED_SECRET_ENV) {
        Some(secret) => Ok(Some(secret)),
        None => store.get_secret(&shared_secret_key(profile)),
    }
}
