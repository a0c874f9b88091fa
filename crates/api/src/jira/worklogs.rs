use reqwest::Method;
use tracing::info;

use super::comments::require_id;
use super::JiraClient;
use crate::error::Result;
use crate::models::{IssueRef, WorklogPayload};
use crate::operation::Operation;

impl JiraClient {
    pub async fn add_worklog(&self, issue: &IssueRef, worklog: &WorklogPayload) -> Result<()> {
        worklog.validate()?;

        let operation = Operation::AddWorklog {
            issue: issue.clone(),
        };
        let url = self.api.endpoint(&["issue", issue.as_str(), "worklog"])?;
        self.api
            .send(&operation, Method::POST, url, Some(worklog))
            .await?;

        info!(issue = %issue, "Worklog added");
        Ok(())
    }

    pub async fn update_worklog(
        &self,
        issue: &IssueRef,
        worklog_id: &str,
        worklog: &WorklogPayload,
    ) -> Result<()> {
        let worklog_id = require_id(worklog_id, "worklog")?;
        worklog.validate_update()?;

        let operation = Operation::UpdateWorklog {
            issue: issue.clone(),
            worklog_id: worklog_id.to_string(),
        };
        let url = self
            .api
            .endpoint(&["issue", issue.as_str(), "worklog", worklog_id])?;
        self.api
            .send(&operation, Method::PUT, url, Some(worklog))
            .await?;

        info!(issue = %issue, worklog_id, "Worklog updated");
        Ok(())
    }

    pub async fn delete_worklog(&self, issue: &IssueRef, worklog_id: &str) -> Result<()> {
        let worklog_id = require_id(worklog_id, "worklog")?;
        let operation = Operation::DeleteWorklog {
            issue: issue.clone(),
            worklog_id: worklog_id.to_string(),
        };
        let url = self
            .api
            .endpoint(&["issue", issue.as_str(), "worklog", worklog_id])?;
        self.api
            .send_empty(&operation, Method::DELETE, url)
            .await?;

        info!(issue = %issue, worklog_id, "Worklog deleted");
        Ok(())
    }
}
