use anyhow::Result;
use clap::Subcommand;
use jira_panel_api::models::CommentBody;

use super::{issue_ref, CommandContext};

#[derive(Subcommand, Debug, Clone)]
pub enum CommentCommand {
    /// List comments on an issue
    List {
        /// Issue key or id (e.g. ABC-123)
        issue: String,
    },
    /// Add a comment to an issue
    Add {
        /// Issue key or id
        issue: String,
        /// Comment text
        #[arg(long)]
        body: String,
        /// Send the body as a rich-text paragraph instead of plain text
        #[arg(long)]
        rich: bool,
    },
    /// Delete a comment from an issue
    Delete {
        /// Issue key or id
        issue: String,
        /// Comment id
        comment_id: String,
    },
}

pub async fn execute(command: CommentCommand, ctx: &CommandContext<'_>) -> Result<()> {
    match command {
        CommentCommand::List { issue } => {
            let comments = ctx.client.fetch_comments(&issue_ref(&issue)?).await?;
            ctx.renderer.render_comments(&comments)
        }
        CommentCommand::Add { issue, body, rich } => {
            let issue = issue_ref(&issue)?;
            let body = if rich {
                CommentBody::paragraph(&body)
            } else {
                CommentBody::Text(body)
            };
            ctx.client.add_comment(&issue, body).await?;
            ctx.renderer.success(&format!("Added comment to {issue}"));
            Ok(())
        }
        CommentCommand::Delete { issue, comment_id } => {
            let issue = issue_ref(&issue)?;
            ctx.client.delete_comment(&issue, &comment_id).await?;
            ctx.renderer
                .success(&format!("Deleted comment {comment_id} from {issue}"));
            Ok(())
        }
    }
}
