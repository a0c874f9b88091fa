use jira_panel_auth::AuthError;
use thiserror::Error;

use crate::operation::Operation;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Jira answered with a non-success status. The response body is never
    /// carried, only the operation and the ids it touched.
    #[error("Failed to {operation} (HTTP {status})")]
    OperationFailed { operation: Operation, status: u16 },

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Signing(#[from] AuthError),

    #[error("Unable to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest {
            message: message.into(),
        }
    }

    /// HTTP status of a failed operation, if Jira answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::OperationFailed { status, .. } => Some(*status),
            ApiError::RequestFailed(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether repeating a read could succeed. Mutations are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::OperationFailed { status, .. } => *status == 429 || *status >= 500,
            ApiError::RequestFailed(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self.status() {
            Some(401) => Some("Verify the API token or app shared secret for this profile"),
            Some(403) => Some("The acting identity lacks permission for this operation"),
            Some(404) => Some("Check that the issue key and resource ids are correct"),
            Some(429) => Some("Jira is rate limiting requests; try again shortly"),
            Some(status) if status >= 500 => Some("Jira reported a server error; try again later"),
            _ => match self {
                ApiError::InvalidRequest { .. } => Some("Review the request parameters"),
                ApiError::Signing(_) => Some("Check the app issuer, subject and shared secret"),
                _ => None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueRef;

    fn failed(operation: Operation, status: u16) -> ApiError {
        ApiError::OperationFailed { operation, status }
    }

    #[test]
    fn test_failure_message_names_comment_and_issue() {
        let err = failed(
            Operation::DeleteComment {
                issue: IssueRef::parse("ABC-1").unwrap(),
                comment_id: "10042".to_string(),
            },
            404,
        );
        let message = err.to_string();
        assert!(message.contains("10042"));
        assert!(message.contains("ABC-1"));
        assert!(message.contains("404"));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(failed(Operation::SearchIssues, 503).is_retryable());
        assert!(failed(Operation::SearchIssues, 429).is_retryable());
        assert!(!failed(Operation::SearchIssues, 400).is_retryable());
        assert!(!ApiError::invalid("nope").is_retryable());
    }

    #[test]
    fn test_suggestion_by_status() {
        assert!(failed(Operation::CreateIssue, 404)
            .suggestion()
            .unwrap()
            .contains("issue key"));
        assert!(failed(Operation::CreateIssue, 403)
            .suggestion()
            .unwrap()
            .contains("permission"));
        assert!(failed(Operation::CreateIssue, 418).suggestion().is_none());
    }
}
