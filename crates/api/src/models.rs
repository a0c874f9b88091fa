//! Request payloads for the issue operations.
//!
//! Responses are not modelled: reads hand back the JSON array Jira returned.
//! Each payload has a `validate` step that the client runs before anything is
//! serialized or sent.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ApiError, Result};

/// Numeric issue id (`10001`) or project-prefixed key (`ABC-123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef(String);

impl IssueRef {
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(ApiError::invalid("issue id or key must not be empty"));
        }
        if is_numeric(value) || is_issue_key(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ApiError::invalid(format!(
                "'{value}' is neither a numeric issue id nor an issue key like ABC-123"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_issue_key(value: &str) -> bool {
    let Some((project, number)) = value.rsplit_once('-') else {
        return false;
    };
    let mut chars = project.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && is_numeric(number)
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IssueRef {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        IssueRef::parse(s)
    }
}

impl AsRef<str> for IssueRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Comment text: either a plain string or an Atlassian Document Format tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentBody {
    Text(String),
    Document(Value),
}

impl CommentBody {
    /// Wrap `text` in a single-paragraph ADF document.
    pub fn paragraph(text: &str) -> Self {
        CommentBody::Document(adf_paragraph(text))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            CommentBody::Text(text) if text.trim().is_empty() => {
                Err(ApiError::invalid("comment body must not be empty"))
            }
            CommentBody::Document(doc) if doc.get("type").and_then(Value::as_str) != Some("doc") => {
                Err(ApiError::invalid("rich-text comment body must be a `doc` node"))
            }
            _ => Ok(()),
        }
    }
}

impl From<&str> for CommentBody {
    fn from(text: &str) -> Self {
        CommentBody::Text(text.to_string())
    }
}

impl From<String> for CommentBody {
    fn from(text: String) -> Self {
        CommentBody::Text(text)
    }
}

pub(crate) fn adf_paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    pub body: CommentBody,
}

impl NewComment {
    pub fn new(body: impl Into<CommentBody>) -> Self {
        Self { body: body.into() }
    }

    pub fn validate(&self) -> Result<()> {
        self.body.validate()
    }
}

/// Body for adding or updating a worklog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPayload {
    /// Jira duration notation, e.g. `3h 20m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
}

const WORKLOG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

impl WorklogPayload {
    pub fn seconds(seconds: u64) -> Self {
        Self {
            time_spent_seconds: Some(seconds),
            ..Default::default()
        }
    }

    pub fn duration(time_spent: impl Into<String>) -> Self {
        Self {
            time_spent: Some(time_spent.into()),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<CommentBody>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn started_at(mut self, started: impl Into<DateTime<FixedOffset>>) -> Self {
        self.started = Some(started.into().format(WORKLOG_TIME_FORMAT).to_string());
        self
    }

    fn has_duration(&self) -> bool {
        self.time_spent
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
            || self.time_spent_seconds.is_some_and(|s| s > 0)
    }

    /// New worklogs need a duration.
    pub fn validate(&self) -> Result<()> {
        if !self.has_duration() {
            return Err(ApiError::invalid(
                "worklog needs timeSpent or a positive timeSpentSeconds",
            ));
        }
        self.validate_comment()
    }

    /// Updates may change any subset of fields but must change something.
    pub fn validate_update(&self) -> Result<()> {
        if !self.has_duration() && self.comment.is_none() && self.started.is_none() {
            return Err(ApiError::invalid("worklog update changes no fields"));
        }
        self.validate_comment()
    }

    fn validate_comment(&self) -> Result<()> {
        match &self.comment {
            Some(comment) => comment.validate(),
            None => Ok(()),
        }
    }
}

/// Field map for creating or editing an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueFields(Map<String, Value>);

impl IssueFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn project_key(self, key: &str) -> Self {
        self.set("project", json!({ "key": key }))
    }

    pub fn issue_type(self, name: &str) -> Self {
        self.set("issuetype", json!({ "name": name }))
    }

    pub fn summary(self, summary: &str) -> Self {
        self.set("summary", summary)
    }

    pub fn description(self, text: &str) -> Self {
        self.set("description", adf_paragraph(text))
    }

    pub fn priority(self, name: &str) -> Self {
        self.set("priority", json!({ "name": name }))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate_create(&self) -> Result<()> {
        for required in ["project", "issuetype"] {
            if self.get(required).map_or(true, Value::is_null) {
                return Err(ApiError::invalid(format!(
                    "new issues need a `{required}` field"
                )));
            }
        }
        Ok(())
    }

    pub fn validate_update(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ApiError::invalid("issue update changes no fields"));
        }
        Ok(())
    }
}

/// `{"fields": {...}}` envelope used by create and update.
#[derive(Debug, Serialize)]
pub(crate) struct IssueMutation<'a> {
    pub fields: &'a IssueFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRequest {
    pub transition: TransitionRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRef {
    pub id: String,
}

impl TransitionRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            transition: TransitionRef { id: id.into() },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.transition.id.trim().is_empty() {
            return Err(ApiError::invalid("transition id must not be empty"));
        }
        Ok(())
    }
}

/// `accountId: null` unassigns the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignRequest {
    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
}

impl AssignRequest {
    pub fn to(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
        }
    }

    pub fn unassign() -> Self {
        Self { account_id: None }
    }

    pub fn validate(&self) -> Result<()> {
        match self.account_id.as_deref() {
            Some(id) if id.trim().is_empty() => {
                Err(ApiError::invalid("account id must not be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// File to upload as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub mime: Option<String>,
}

impl AttachmentFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ApiError::invalid(format!("{} has no usable file name", path.display()))
            })?
            .to_string();
        let content = tokio::fs::read(path).await?;
        Ok(Self::new(filename, content))
    }

    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(ApiError::invalid("attachment file name must not be empty"));
        }
        Ok(())
    }
}

/// JSON rendition of an attachment: file name plus base64 content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    pub filename: String,
    pub content: String,
}

impl From<&AttachmentFile> for AttachmentPayload {
    fn from(file: &AttachmentFile) -> Self {
        Self {
            filename: file.filename.clone(),
            content: STANDARD.encode(&file.content),
        }
    }
}

impl AttachmentPayload {
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(ApiError::invalid("attachment file name must not be empty"));
        }
        Ok(())
    }
}

/// JQL query text. Encoded only when the request URL is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jql(String);

impl Jql {
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ApiError::invalid("JQL query must not be empty"));
        }
        Ok(Self(query))
    }

    /// Percent-encode every reserved character so the query survives as a
    /// single `jql` parameter value.
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for Jql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
