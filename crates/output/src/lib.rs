//! Rendering of comments and issues returned by the client.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const PREVIEW_CHARS: usize = 60;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    /// Only ids (comments) or keys (issues), one per line.
    Quiet,
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct CommentRow {
    pub id: String,
    pub author: String,
    pub created: String,
    pub body: String,
}

impl CommentRow {
    pub fn from_value(comment: &Value) -> Self {
        Self {
            id: text_field(comment, "id"),
            author: comment
                .pointer("/author/displayName")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            created: text_field(comment, "created"),
            body: preview(&comment.get("body").map(body_text).unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct IssueRow {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
}

impl IssueRow {
    pub fn from_value(issue: &Value) -> Self {
        let field = |pointer: &str| {
            issue
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        Self {
            key: text_field(issue, "key"),
            summary: preview(&field("/fields/summary")),
            status: field("/fields/status/name"),
            assignee: field("/fields/assignee/displayName"),
        }
    }
}

/// One configured profile, as listed by `auth list`.
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct ProfileRow {
    pub name: String,
    pub base_url: String,
    pub email: String,
    pub has_token: bool,
    pub has_app: bool,
    pub is_default: bool,
}

pub struct OutputRenderer {
    format: OutputFormat,
}

impl OutputRenderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn render_comments(&self, comments: &[Value]) -> Result<()> {
        let rows: Vec<CommentRow> = comments.iter().map(CommentRow::from_value).collect();
        self.emit(comments, &rows, |row| row.id.clone())
    }

    pub fn render_issues(&self, issues: &[Value]) -> Result<()> {
        let rows: Vec<IssueRow> = issues.iter().map(IssueRow::from_value).collect();
        self.emit(issues, &rows, |row| row.key.clone())
    }

    pub fn render_profiles(&self, profiles: &[ProfileRow]) -> Result<()> {
        self.emit(profiles, profiles, |row| row.name.clone())
    }

    /// Confirmation line for a completed mutation. Silent in quiet mode.
    pub fn success(&self, message: &str) {
        if self.format != OutputFormat::Quiet {
            println!("{} {}", "✔".green().bold(), message);
        }
    }

    fn emit<S: Serialize + ?Sized, R: Tabled>(
        &self,
        raw: &S,
        rows: &[R],
        quiet_key: impl Fn(&R) -> String,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Table if rows.is_empty() => println!("{}", "(none)".dimmed()),
            OutputFormat::Table => println!("{}", Table::new(rows).with(Style::rounded())),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(raw)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(raw)?),
            OutputFormat::Quiet => {
                for row in rows {
                    println!("{}", quiet_key(row));
                }
            }
        }
        Ok(())
    }
}

/// Plain text of a comment body: strings as-is, ADF documents flattened with
/// one line per block.
pub fn body_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Object(_) => {
            let mut out = String::new();
            collect_adf_text(body, &mut out);
            out.trim_end().to_string()
        }
        _ => String::new(),
    }
}

fn collect_adf_text(node: &Value, out: &mut String) {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("hardBreak") => out.push('\n'),
        Some("mention") => {
            if let Some(text) = node.pointer("/attrs/text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        _ => {}
    }

    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_adf_text(child, out);
        }
        if matches!(
            node.get("type").and_then(Value::as_str),
            Some("paragraph" | "heading" | "codeBlock" | "listItem")
        ) {
            out.push('\n');
        }
    }
}

fn text_field(value: &Value, name: &str) -> String {
    match value.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_body_text_plain() {
        assert_eq!(body_text(&json!("hello")), "hello");
        assert_eq!(body_text(&json!(null)), "");
    }

    #[test]
    fn test_body_text_adf() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Hi "},
                    {"type": "mention", "attrs": {"id": "1", "text": "@Ana"}}
                ]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "line"},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "two"}
                ]}
            ]
        });
        assert_eq!(body_text(&doc), "Hi @Ana\nline\ntwo");
    }

    #[test]
    fn test_comment_row() {
        let row = CommentRow::from_value(&json!({
            "id": "10042",
            "author": {"displayName": "Jane Doe"},
            "created": "2025-01-01T10:00:00.000+0000",
            "body": "short note"
        }));
        assert_eq!(row.id, "10042");
        assert_eq!(row.author, "Jane Doe");
        assert_eq!(row.body, "short note");
    }

    #[test]
    fn test_comment_row_tolerates_missing_fields() {
        let row = CommentRow::from_value(&json!({ "id": 7 }));
        assert_eq!(row.id, "7");
        assert_eq!(row.author, "");
        assert_eq!(row.body, "");
    }

    #[test]
    fn test_issue_row() {
        let row = IssueRow::from_value(&json!({
            "key": "ABC-1",
            "fields": {
                "summary": "Fix login",
                "status": {"name": "In Progress"},
                "assignee": null
            }
        }));
        assert_eq!(row.key, "ABC-1");
        assert_eq!(row.status, "In Progress");
        assert_eq!(row.assignee, "");
    }

    #[test]
    fn test_preview_truncates_and_flattens() {
        let long = "word ".repeat(40);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS);
        assert!(shown.ends_with('…'));
        assert_eq!(preview("a\n\n b"), "a b");
    }

    #[test]
    fn test_render_every_format() {
        let comments = vec![json!({"id": "1", "body": "x"})];
        for format in [
            OutputFormat::Table,
            OutputFormat::Json,
            OutputFormat::Yaml,
            OutputFormat::Quiet,
        ] {
            let renderer = OutputRenderer::new(format);
            assert!(renderer.render_comments(&comments).is_ok());
            assert!(renderer.render_issues(&[]).is_ok());
        }
    }

    #[test]
    fn test_render_profiles_every_format() {
        let profiles = vec![ProfileRow {
            name: "work".to_string(),
            base_url: "https://acme.atlassian.net/".to_string(),
            email: "dev@example.com".to_string(),
            has_token: true,
            has_app: false,
            is_default: true,
        }];
        for format in [
            OutputFormat::Table,
            OutputFormat::Json,
            OutputFormat::Yaml,
            OutputFormat::Quiet,
        ] {
            assert!(OutputRenderer::new(format).render_profiles(&profiles).is_ok());
        }
    }
}
