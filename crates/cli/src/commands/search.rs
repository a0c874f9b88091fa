use anyhow::Result;
use clap::Args;
use jira_panel_api::models::Jql;

use super::CommandContext;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// JQL query, e.g. 'project = ABC AND status = "In Progress"'
    #[arg(long)]
    pub jql: String,
}

pub async fn execute(args: SearchArgs, ctx: &CommandContext<'_>) -> Result<()> {
    let jql = Jql::new(args.jql)?;
    let issues = ctx.client.search_issues(&jql).await?;

    if issues.is_empty() {
        tracing::info!(%jql, "No issues matched");
    }
    ctx.renderer.render_issues(&issues)
}
