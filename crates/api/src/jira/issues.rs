use reqwest::Method;
use tracing::info;

use super::JiraClient;
use crate::error::Result;
use crate::models::{AssignRequest, IssueFields, IssueMutation, IssueRef, TransitionRequest};
use crate::operation::Operation;

impl JiraClient {
    pub async fn create_issue(&self, fields: &IssueFields) -> Result<()> {
        fields.validate_create()?;

        let url = self.api.endpoint(&["issue"])?;
        self.api
            .send(
                &Operation::CreateIssue,
                Method::POST,
                url,
                Some(&IssueMutation { fields }),
            )
            .await?;

        info!(fields = fields.len(), "Issue created");
        Ok(())
    }

    pub async fn update_issue(&self, issue: &IssueRef, fields: &IssueFields) -> Result<()> {
        fields.validate_update()?;

        let operation = Operation::UpdateIssue {
            issue: issue.clone(),
        };
        let url = self.api.endpoint(&["issue", issue.as_str()])?;
        self.api
            .send(&operation, Method::PUT, url, Some(&IssueMutation { fields }))
            .await?;

        info!(issue = %issue, fields = fields.len(), "Issue updated");
        Ok(())
    }

    pub async fn delete_issue(&self, issue: &IssueRef) -> Result<()> {
        let operation = Operation::DeleteIssue {
            issue: issue.clone(),
        };
        let url = self.api.endpoint(&["issue", issue.as_str()])?;
        self.api
            .send_empty(&operation, Method::DELETE, url)
            .await?;

        info!(issue = %issue, "Issue deleted");
        Ok(())
    }

    pub async fn transition_issue(&self, issue: &IssueRef, transition_id: &str) -> Result<()> {
        let request = TransitionRequest::new(transition_id.trim());
        request.validate()?;

        let operation = Operation::TransitionIssue {
            issue: issue.clone(),
        };
        let url = self
            .api
            .endpoint(&["issue", issue.as_str(), "transitions"])?;
        self.api
            .send(&operation, Method::POST, url, Some(&request))
            .await?;

        info!(issue = %issue, transition_id = %request.transition.id, "Issue transitioned");
        Ok(())
    }

    pub async fn assign_issue(&self, issue: &IssueRef, account_id: &str) -> Result<()> {
        self.put_assignee(issue, AssignRequest::to(account_id.trim()))
            .await?;
        info!(issue = %issue, account_id, "Issue assigned");
        Ok(())
    }

    pub async fn unassign_issue(&self, issue: &IssueRef) -> Result<()> {
        self.put_assignee(issue, AssignRequest::unassign()).await?;
        info!(issue = %issue, "Issue unassigned");
        Ok(())
    }

    async fn put_assignee(&self, issue: &IssueRef, request: AssignRequest) -> Result<()> {
        request.validate()?;

        let operation = Operation::AssignIssue {
            issue: issue.clone(),
        };
        let url = self.api.endpoint(&["issue", issue.as_str(), "assignee"])?;
        self.api
            .send(&operation, Method::PUT, url, Some(&request))
            .await?;
        Ok(())
    }
}
