use std::fmt;

use crate::models::IssueRef;

/// A client operation together with the resources it touches. Used to label
/// log lines and failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    FetchComments { issue: IssueRef },
    AddComment { issue: IssueRef },
    DeleteComment { issue: IssueRef, comment_id: String },
    AddWorklog { issue: IssueRef },
    UpdateWorklog { issue: IssueRef, worklog_id: String },
    DeleteWorklog { issue: IssueRef, worklog_id: String },
    AddAttachment { issue: IssueRef },
    DeleteAttachment { attachment_id: String },
    CreateIssue,
    UpdateIssue { issue: IssueRef },
    DeleteIssue { issue: IssueRef },
    TransitionIssue { issue: IssueRef },
    AssignIssue { issue: IssueRef },
    SearchIssues,
}

impl Operation {
    /// Stable identifier for structured logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FetchComments { .. } => "fetch_comments",
            Operation::AddComment { .. } => "add_comment",
            Operation::DeleteComment { .. } => "delete_comment",
            Operation::AddWorklog { .. } => "add_worklog",
            Operation::UpdateWorklog { .. } => "update_worklog",
            Operation::DeleteWorklog { .. } => "delete_worklog",
            Operation::AddAttachment { .. } => "add_attachment",
            Operation::DeleteAttachment { .. } => "delete_attachment",
            Operation::CreateIssue => "create_issue",
            Operation::UpdateIssue { .. } => "update_issue",
            Operation::DeleteIssue { .. } => "delete_issue",
            Operation::TransitionIssue { .. } => "transition_issue",
            Operation::AssignIssue { .. } => "assign_issue",
            Operation::SearchIssues => "search_issues",
        }
    }

    pub fn issue(&self) -> Option<&IssueRef> {
        match self {
            Operation::FetchComments { issue }
            | Operation::AddComment { issue }
            | Operation::DeleteComment { issue, .. }
            | Operation::AddWorklog { issue }
            | Operation::UpdateWorklog { issue, .. }
            | Operation::DeleteWorklog { issue, .. }
            | Operation::AddAttachment { issue }
            | Operation::UpdateIssue { issue }
            | Operation::DeleteIssue { issue }
            | Operation::TransitionIssue { issue }
            | Operation::AssignIssue { issue } => Some(issue),
            Operation::DeleteAttachment { .. } | Operation::CreateIssue | Operation::SearchIssues => {
                None
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::FetchComments { issue } => write!(f, "fetch comments for issue {issue}"),
            Operation::AddComment { issue } => write!(f, "add comment to issue {issue}"),
            Operation::DeleteComment { issue, comment_id } => {
                write!(f, "delete comment {comment_id} from issue {issue}")
            }
            Operation::AddWorklog { issue } => write!(f, "add worklog to issue {issue}"),
            Operation::UpdateWorklog { issue, worklog_id } => {
                write!(f, "update worklog {worklog_id} for issue {issue}")
            }
            Operation::DeleteWorklog { issue, worklog_id } => {
                write!(f, "delete worklog {worklog_id} from issue {issue}")
            }
            Operation::AddAttachment { issue } => write!(f, "add attachment to issue {issue}"),
            Operation::DeleteAttachment { attachment_id } => {
                write!(f, "delete attachment {attachment_id}")
            }
            Operation::CreateIssue => f.write_str("create issue"),
            Operation::UpdateIssue { issue } => write!(f, "update issue {issue}"),
            Operation::DeleteIssue { issue } => write!(f, "delete issue {issue}"),
            Operation::TransitionIssue { issue } => write!(f, "transition issue {issue}"),
            Operation::AssignIssue { issue } => write!(f, "assign issue {issue}"),
            Operation::SearchIssues => f.write_str("search issues"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc1() -> IssueRef {
        IssueRef::parse("ABC-1").unwrap()
    }

    #[test]
    fn test_display_includes_every_id() {
        let op = Operation::UpdateWorklog {
            issue: abc1(),
            worklog_id: "777".to_string(),
        };
        assert_eq!(op.to_string(), "update worklog 777 for issue ABC-1");

        let op = Operation::DeleteAttachment {
            attachment_id: "55".to_string(),
        };
        assert_eq!(op.to_string(), "delete attachment 55");
        assert!(op.issue().is_none());
    }

    #[test]
    fn test_display_for_every_operation() {
        let id = |s: &str| s.to_string();
        let cases = [
            (Operation::FetchComments { issue: abc1() }, "fetch comments for issue ABC-1"),
            (Operation::AddComment { issue: abc1() }, "add comment to issue ABC-1"),
            (
                Operation::DeleteComment { issue: abc1(), comment_id: id("10042") },
                "delete comment 10042 from issue ABC-1",
            ),
            (Operation::AddWorklog { issue: abc1() }, "add worklog to issue ABC-1"),
            (
                Operation::UpdateWorklog { issue: abc1(), worklog_id: id("9") },
                "update worklog 9 for issue ABC-1",
            ),
            (
                Operation::DeleteWorklog { issue: abc1(), worklog_id: id("9") },
                "delete worklog 9 from issue ABC-1",
            ),
            (Operation::AddAttachment { issue: abc1() }, "add attachment to issue ABC-1"),
            (
                Operation::DeleteAttachment { attachment_id: id("55") },
                "delete attachment 55",
            ),
            (Operation::CreateIssue, "create issue"),
            (Operation::UpdateIssue { issue: abc1() }, "update issue ABC-1"),
            (Operation::DeleteIssue { issue: abc1() }, "delete issue ABC-1"),
            (Operation::TransitionIssue { issue: abc1() }, "transition issue ABC-1"),
            (Operation::AssignIssue { issue: abc1() }, "assign issue ABC-1"),
            (Operation::SearchIssues, "search issues"),
        ];

        for (op, expected) in cases {
            assert_eq!(op.to_string(), expected, "{}", op.name());
            assert_eq!(
                op.issue().is_some(),
                expected.contains("ABC-1"),
                "{}",
                op.name()
            );
        }
    }

    #[test]
    fn test_create_is_generic() {
        assert_eq!(Operation::CreateIssue.to_string(), "create issue");
        assert_eq!(Operation::CreateIssue.name(), "create_issue");
    }

    #[test]
    fn test_issue_accessor() {
        let op = Operation::TransitionIssue { issue: abc1() };
        assert_eq!(op.issue().map(IssueRef::as_str), Some("ABC-1"));
    }
}
