//! Comment panel for a single issue: two text fields and two buttons.
//!
//! The panel is a pure state machine. [`update`] takes the current field
//! values and an event and returns the next values plus at most one effect to
//! run against Jira. Fields are cleared only once the effect is reported done,
//! so a failed request leaves the input in place for another attempt.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    pub comment_body: String,
    pub comment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    CommentBodyChanged(String),
    CommentIdChanged(String),
    AddCommentClicked,
    DeleteCommentClicked,
    CommentAdded,
    CommentDeleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEffect {
    AddComment { body: String },
    DeleteComment { comment_id: String },
}

impl PanelEffect {
    /// Event to feed back once the effect succeeded.
    pub fn completion(&self) -> PanelEvent {
        match self {
            PanelEffect::AddComment { .. } => PanelEvent::CommentAdded,
            PanelEffect::DeleteComment { .. } => PanelEvent::CommentDeleted,
        }
    }
}

pub fn update(state: PanelState, event: PanelEvent) -> (PanelState, Option<PanelEffect>) {
    match event {
        PanelEvent::CommentBodyChanged(comment_body) => (
            PanelState {
                comment_body,
                ..state
            },
            None,
        ),
        PanelEvent::CommentIdChanged(comment_id) => (
            PanelState {
                comment_id,
                ..state
            },
            None,
        ),
        PanelEvent::AddCommentClicked if state.comment_body.trim().is_empty() => (state, None),
        PanelEvent::AddCommentClicked => {
            let effect = PanelEffect::AddComment {
                body: state.comment_body.clone(),
            };
            (state, Some(effect))
        }
        PanelEvent::DeleteCommentClicked if state.comment_id.trim().is_empty() => (state, None),
        PanelEvent::DeleteCommentClicked => {
            let effect = PanelEffect::DeleteComment {
                comment_id: state.comment_id.trim().to_string(),
            };
            (state, Some(effect))
        }
        PanelEvent::CommentAdded => (
            PanelState {
                comment_body: String::new(),
                ..state
            },
            None,
        ),
        PanelEvent::CommentDeleted => (
            PanelState {
                comment_id: String::new(),
                ..state
            },
            None,
        ),
    }
}

/// One line of panel input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelInput {
    Event(PanelEvent),
    List,
    Show,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Option<PanelInput> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (command, rest) = match line.trim_start().split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line.trim(), ""),
    };

    let input = match command {
        "body" => PanelInput::Event(PanelEvent::CommentBodyChanged(rest.to_string())),
        "id" => PanelInput::Event(PanelEvent::CommentIdChanged(rest.trim().to_string())),
        "add" => PanelInput::Event(PanelEvent::AddCommentClicked),
        "delete" => PanelInput::Event(PanelEvent::DeleteCommentClicked),
        "list" => PanelInput::List,
        "show" => PanelInput::Show,
        "help" | "?" => PanelInput::Help,
        "quit" | "exit" => PanelInput::Quit,
        _ => return None,
    };
    Some(input)
}
