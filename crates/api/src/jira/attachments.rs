use jira_panel_auth::AppCredentials;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, info};

use super::comments::require_id;
use super::JiraClient;
use crate::check_status;
use crate::error::{ApiError, Result};
use crate::models::{AttachmentFile, AttachmentPayload, IssueRef};
use crate::operation::Operation;

/// Jira refuses attachment writes without this XSRF override.
const XSRF_HEADER: &str = "X-Atlassian-Token";
const XSRF_NO_CHECK: &str = "no-check";

impl JiraClient {
    /// Attach a file sent as a JSON payload under the client's own identity.
    pub async fn add_attachment(&self, issue: &IssueRef, file: &AttachmentFile) -> Result<()> {
        file.validate()?;
        let payload = AttachmentPayload::from(file);
        payload.validate()?;

        let operation = Operation::AddAttachment {
            issue: issue.clone(),
        };
        let url = self
            .api
            .endpoint(&["issue", issue.as_str(), "attachments"])?;
        debug!(op = operation.name(), url = %url, filename = %file.filename, "Sending JSON attachment");

        let request = self
            .api
            .apply_auth(self.api.raw_request(Method::POST, url))?
            .header(XSRF_HEADER, XSRF_NO_CHECK)
            .json(&payload);
        check_status(&operation, request.send().await?)?;

        info!(issue = %issue, filename = %file.filename, "Attachment added");
        Ok(())
    }

    /// Upload a file as `multipart/form-data`, signed with a freshly minted
    /// app assertion regardless of the client's configured identity.
    pub async fn upload_attachment(
        &self,
        issue: &IssueRef,
        file: AttachmentFile,
        credentials: &AppCredentials,
    ) -> Result<()> {
        file.validate()?;

        let operation = Operation::AddAttachment {
            issue: issue.clone(),
        };
        let url = self
            .api
            .endpoint(&["issue", issue.as_str(), "attachments"])?;
        let token = credentials.mint()?;

        let filename = file.filename.clone();
        let mut part = Part::bytes(file.content).file_name(filename.clone());
        if let Some(mime) = file.mime.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|_| ApiError::invalid(format!("invalid MIME type '{mime}'")))?;
        }
        let form = Form::new().part("file", part);

        debug!(op = operation.name(), url = %url, %filename, "Uploading multipart attachment");
        let response = self
            .api
            .raw_request(Method::POST, url)
            .header(XSRF_HEADER, XSRF_NO_CHECK)
            .header(AUTHORIZATION, format!("JWT {token}"))
            .multipart(form)
            .send()
            .await?;
        check_status(&operation, response)?;

        info!(issue = %issue, %filename, "Attachment uploaded");
        Ok(())
    }

    pub async fn delete_attachment(&self, attachment_id: &str) -> Result<()> {
        let attachment_id = require_id(attachment_id, "attachment")?;
        let operation = Operation::DeleteAttachment {
            attachment_id: attachment_id.to_string(),
        };
        let url = self.api.endpoint(&["attachment", attachment_id])?;
        self.api
            .send_empty(&operation, Method::DELETE, url)
            .await?;

        info!(attachment_id, "Attachment deleted");
        Ok(())
    }
}
