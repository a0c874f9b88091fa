use anyhow::{Context, Result};
use clap::Args;
use jira_panel_api::models::IssueRef;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{issue_ref, CommandContext};
use crate::panel::{parse_input, update, PanelEffect, PanelEvent, PanelInput, PanelState};

#[derive(Args, Debug, Clone)]
pub struct PanelArgs {
    /// Issue the panel is attached to
    pub issue: String,
}

const HELP: &str = "\
  body <text>   set the comment body field
  add           add the comment body to the issue
  id <id>       set the comment id field
  delete        delete the comment with that id
  list          show the issue's comments
  show          show both fields
  quit          leave the panel";

pub async fn execute(args: PanelArgs, ctx: &CommandContext<'_>) -> Result<()> {
    let issue = issue_ref(&args.issue)?;
    let mut state = PanelState::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Add or delete comments on {issue} (type `help` for commands)");

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let Some(input) = parse_input(&line) else {
            if !line.trim().is_empty() {
                println!("Unknown command. Type `help` for commands.");
            }
            continue;
        };

        match input {
            PanelInput::Event(event) => state = dispatch(ctx, &issue, state, event).await,
            PanelInput::List => match ctx.client.fetch_comments(&issue).await {
                Ok(comments) => ctx.renderer.render_comments(&comments)?,
                Err(err) => eprintln!("Error: {err}"),
            },
            PanelInput::Show => {
                println!("Comment body: {}", state.comment_body);
                println!("Comment ID to delete: {}", state.comment_id);
            }
            PanelInput::Help => println!("{HELP}"),
            PanelInput::Quit => break,
        }
    }
    Ok(())
}

/// Apply one event, run its effect, and feed the completion back in. A failed
/// effect is reported and leaves the fields as they were.
async fn dispatch(
    ctx: &CommandContext<'_>,
    issue: &IssueRef,
    state: PanelState,
    event: PanelEvent,
) -> PanelState {
    let clicked = matches!(
        event,
        PanelEvent::AddCommentClicked | PanelEvent::DeleteCommentClicked
    );
    let (state, effect) = update(state, event);

    let Some(effect) = effect else {
        if clicked {
            println!("Fill in the field first.");
        }
        return state;
    };

    let outcome = match &effect {
        PanelEffect::AddComment { body } => ctx.client.add_comment(issue, body.as_str()).await,
        PanelEffect::DeleteComment { comment_id } => {
            ctx.client.delete_comment(issue, comment_id).await
        }
    };

    match outcome {
        Ok(()) => {
            match &effect {
                PanelEffect::AddComment { .. } => ctx.renderer.success("Comment added"),
                PanelEffect::DeleteComment { comment_id } => {
                    ctx.renderer.success(&format!("Comment {comment_id} deleted"))
                }
            }
            update(state, effect.completion()).0
        }
        Err(err) => {
            tracing::warn!(error = %err, "Panel action failed");
            eprintln!("Error: {err}");
            state
        }
    }
}
