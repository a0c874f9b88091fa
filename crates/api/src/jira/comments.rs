use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::JiraClient;
use crate::error::Result;
use crate::models::{CommentBody, IssueRef, NewComment};
use crate::operation::Operation;

impl JiraClient {
    pub async fn fetch_comments(&self, issue: &IssueRef) -> Result<Vec<Value>> {
        let operation = Operation::FetchComments {
            issue: issue.clone(),
        };
        let url = self.api.endpoint(&["issue", issue.as_str(), "comment"])?;
        self.api.fetch_array(&operation, url, "comments").await
    }

    pub async fn add_comment(
        &self,
        issue: &IssueRef,
        body: impl Into<CommentBody>,
    ) -> Result<()> {
        let comment = NewComment::new(body);
        comment.validate()?;

        let operation = Operation::AddComment {
            issue: issue.clone(),
        };
        let url = self.api.endpoint(&["issue", issue.as_str(), "comment"])?;
        self.api
            .send(&operation, Method::POST, url, Some(&comment))
            .await?;

        info!(issue = %issue, "Comment added");
        Ok(())
    }

    pub async fn delete_comment(&self, issue: &IssueRef, comment_id: &str) -> Result<()> {
        let comment_id = require_id(comment_id, "comment")?;
        let operation = Operation::DeleteComment {
            issue: issue.clone(),
            comment_id: comment_id.to_string(),
        };
        let url = self
            .api
            .endpoint(&["issue", issue.as_str(), "comment", comment_id])?;
        self.api
            .send_empty(&operation, Method::DELETE, url)
            .await?;

        info!(issue = %issue, comment_id, "Comment deleted");
        Ok(())
    }
}

/// Trimmed resource id, or an error naming the resource kind.
pub(super) fn require_id<'a>(id: &'a str, kind: &str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(crate::ApiError::invalid(format!("{kind} id must not be empty")));
    }
    Ok(id)
}
