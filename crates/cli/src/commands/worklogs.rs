use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Args, Subcommand};
use jira_panel_api::models::WorklogPayload;

use super::{issue_ref, CommandContext};

#[derive(Subcommand, Debug, Clone)]
pub enum WorklogCommand {
    /// Log time on an issue
    Add {
        /// Issue key or id
        issue: String,
        #[command(flatten)]
        fields: WorklogFields,
    },
    /// Change an existing worklog
    Update {
        /// Issue key or id
        issue: String,
        /// Worklog id
        worklog_id: String,
        #[command(flatten)]
        fields: WorklogFields,
    },
    /// Delete a worklog
    Delete {
        /// Issue key or id
        issue: String,
        /// Worklog id
        worklog_id: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct WorklogFields {
    /// Time spent in Jira notation (e.g. "1h 30m")
    #[arg(long, conflicts_with = "seconds")]
    pub time_spent: Option<String>,
    /// Time spent in seconds
    #[arg(long)]
    pub seconds: Option<u64>,
    /// Worklog comment
    #[arg(long)]
    pub comment: Option<String>,
    /// Start time, RFC 3339 (e.g. 2025-01-31T09:00:00+01:00)
    #[arg(long)]
    pub started: Option<DateTime<FixedOffset>>,
}

impl WorklogFields {
    fn into_payload(self) -> WorklogPayload {
        let mut payload = WorklogPayload {
            time_spent: self.time_spent,
            time_spent_seconds: self.seconds,
            ..Default::default()
        };
        if let Some(comment) = self.comment {
            payload = payload.with_comment(comment);
        }
        if let Some(started) = self.started {
            payload = payload.started_at(started);
        }
        payload
    }
}

pub async fn execute(command: WorklogCommand, ctx: &CommandContext<'_>) -> Result<()> {
    match command {
        WorklogCommand::Add { issue, fields } => {
            let issue = issue_ref(&issue)?;
            if fields.time_spent.is_none() && fields.seconds.is_none() {
                return Err(anyhow!("Pass --time-spent or --seconds"));
            }
            ctx.client
                .add_worklog(&issue, &fields.into_payload())
                .await?;
            ctx.renderer.success(&format!("Logged work on {issue}"));
        }
        WorklogCommand::Update {
            issue,
            worklog_id,
            fields,
        } => {
            let issue = issue_ref(&issue)?;
            ctx.client
                .update_worklog(&issue, &worklog_id, &fields.into_payload())
                .await?;
            ctx.renderer
                .success(&format!("Updated worklog {worklog_id} on {issue}"));
        }
        WorklogCommand::Delete { issue, worklog_id } => {
            let issue = issue_ref(&issue)?;
            ctx.client.delete_worklog(&issue, &worklog_id).await?;
            ctx.renderer
                .success(&format!("Deleted worklog {worklog_id} from {issue}"));
        }
    }
    Ok(())
}
