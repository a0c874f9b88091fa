use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use jira_panel_api::models::IssueFields;
use serde_json::Value;

use super::{issue_ref, CommandContext};

#[derive(Subcommand, Debug, Clone)]
pub enum IssueCommand {
    /// Create a new issue
    Create {
        /// Project key
        #[arg(long)]
        project: String,
        /// Issue type (e.g. Task, Bug, Story)
        #[arg(long)]
        issue_type: String,
        /// Issue summary
        #[arg(long)]
        summary: String,
        #[command(flatten)]
        extra: FieldArgs,
    },
    /// Update fields of an existing issue
    Update {
        /// Issue key or id
        issue: String,
        /// New summary
        #[arg(long)]
        summary: Option<String>,
        #[command(flatten)]
        extra: FieldArgs,
    },
    /// Delete an issue
    Delete {
        /// Issue key or id
        issue: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Move an issue through its workflow
    Transition {
        /// Issue key or id
        issue: String,
        /// Transition id
        #[arg(long)]
        transition: String,
    },
    /// Assign an issue to a user
    Assign {
        /// Issue key or id
        issue: String,
        /// Assignee account id
        #[arg(long)]
        account_id: String,
    },
    /// Remove the assignee of an issue
    Unassign {
        /// Issue key or id
        issue: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    /// Description (sent as a rich-text paragraph)
    #[arg(long)]
    pub description: Option<String>,
    /// Priority name (e.g. High)
    #[arg(long)]
    pub priority: Option<String>,
    /// Extra field as NAME=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

impl FieldArgs {
    fn apply(self, mut fields: IssueFields) -> IssueFields {
        if let Some(description) = self.description.as_deref() {
            fields = fields.description(description);
        }
        if let Some(priority) = self.priority.as_deref() {
            fields = fields.priority(priority);
        }
        for (name, value) in self.fields {
            fields = fields.set(name, value);
        }
        fields
    }
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

pub async fn execute(command: IssueCommand, ctx: &CommandContext<'_>) -> Result<()> {
    match command {
        IssueCommand::Create {
            project,
            issue_type,
            summary,
            extra,
        } => {
            let fields = extra.apply(
                IssueFields::new()
                    .project_key(&project)
                    .issue_type(&issue_type)
                    .summary(&summary),
            );
            ctx.client.create_issue(&fields).await?;
            ctx.renderer
                .success(&format!("Created {issue_type} in {project}: {summary}"));
        }
        IssueCommand::Update {
            issue,
            summary,
            extra,
        } => {
            let issue = issue_ref(&issue)?;
            let mut fields = IssueFields::new();
            if let Some(summary) = summary.as_deref() {
                fields = fields.summary(summary);
            }
            let fields = extra.apply(fields);
            if fields.is_empty() {
                return Err(anyhow!("Nothing to update; pass --summary, --description, --priority or --field"));
            }
            ctx.client.update_issue(&issue, &fields).await?;
            ctx.renderer.success(&format!("Updated {issue}"));
        }
        IssueCommand::Delete { issue, force } => {
            let issue = issue_ref(&issue)?;
            if !force {
                println!("About to delete issue {issue}. Use --force to confirm.");
                return Ok(());
            }
            ctx.client.delete_issue(&issue).await?;
            ctx.renderer.success(&format!("Deleted {issue}"));
        }
        IssueCommand::Transition { issue, transition } => {
            let issue = issue_ref(&issue)?;
            ctx.client.transition_issue(&issue, &transition).await?;
            ctx.renderer
                .success(&format!("Transitioned {issue} via {transition}"));
        }
        IssueCommand::Assign { issue, account_id } => {
            let issue = issue_ref(&issue)?;
            ctx.client.assign_issue(&issue, &account_id).await?;
            ctx.renderer
                .success(&format!("Assigned {issue} to {account_id}"));
        }
        IssueCommand::Unassign { issue } => {
            let issue = issue_ref(&issue)?;
            ctx.client.unassign_issue(&issue).await?;
            ctx.renderer.success(&format!("Unassigned {issue}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_field_json_value() {
        let (name, value) = parse_field(r#"labels=["ui","panel"]"#).unwrap();
        assert_eq!(name, "labels");
        assert_eq!(value, json!(["ui", "panel"]));
    }

    #[test]
    fn test_parse_field_falls_back_to_string() {
        let (name, value) = parse_field("customfield_10010=some text").unwrap();
        assert_eq!(name, "customfield_10010");
        assert_eq!(value, json!("some text"));
    }

    #[test]
    fn test_parse_field_requires_name() {
        assert!(parse_field("=1").is_err());
        assert!(parse_field("novalue").is_err());
    }

    #[test]
    fn test_field_args_apply() {
        let args = FieldArgs {
            description: Some("details".to_string()),
            priority: Some("High".to_string()),
            fields: vec![("labels".to_string(), json!(["a"]))],
        };
        let fields = args.apply(IssueFields::new());
        assert_eq!(fields.get("priority"), Some(&json!({ "name": "High" })));
        assert_eq!(fields.get("description").unwrap()["type"], "doc");
        assert_eq!(fields.len(), 3);
    }
}
