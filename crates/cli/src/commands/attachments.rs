use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use jira_panel_api::models::AttachmentFile;
use jira_panel_api::AppCredentials;

use super::{issue_ref, CommandContext};

#[derive(Subcommand, Debug, Clone)]
pub enum AttachmentCommand {
    /// Attach a file to an issue
    Add {
        /// Issue key or id
        issue: String,
        /// File to upload
        file: PathBuf,
        /// Send the file base64-encoded in a JSON body under the active
        /// identity instead of a signed multipart upload
        #[arg(long)]
        json: bool,
        /// MIME type for the multipart part
        #[arg(long, conflicts_with = "json")]
        mime: Option<String>,
    },
    /// Delete an attachment
    Delete {
        /// Attachment id
        attachment_id: String,
    },
}

pub async fn execute(
    command: AttachmentCommand,
    ctx: &CommandContext<'_>,
    app: Option<&AppCredentials>,
) -> Result<()> {
    match command {
        AttachmentCommand::Add {
            issue,
            file,
            json,
            mime,
        } => {
            let issue = issue_ref(&issue)?;
            let mut attachment = AttachmentFile::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = attachment.filename.clone();

            if json {
                ctx.client.add_attachment(&issue, &attachment).await?;
            } else {
                let credentials = app.ok_or_else(|| {
                    anyhow!("Multipart uploads are signed as the app; configure app credentials or pass --json")
                })?;
                if let Some(mime) = mime {
                    attachment = attachment.with_mime(mime);
                }
                ctx.client
                    .upload_attachment(&issue, attachment, credentials)
                    .await?;
            }
            ctx.renderer
                .success(&format!("Attached '{filename}' to {issue}"));
        }
        AttachmentCommand::Delete { attachment_id } => {
            ctx.client.delete_attachment(&attachment_id).await?;
            ctx.renderer
                .success(&format!("Deleted attachment {attachment_id}"));
        }
    }
    Ok(())
}
