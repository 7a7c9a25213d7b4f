use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action_data::ActionData;

/// Identifies one history entry for as long as it stays in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandHandle(u64);

impl CommandHandle {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// One or more actions that land in history as a single entry.
///
/// Constituents are performed and redone in order, undone in reverse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub actions: Vec<ActionData>,
}

impl Command {
    pub fn new(action: ActionData) -> Self {
        Self { label: None, actions: vec![action] }
    }

    pub fn compound(label: impl Into<String>, actions: Vec<ActionData>) -> Self {
        Self { label: Some(label.into()), actions }
    }

    pub fn push(&mut self, action: ActionData) {
        self.actions.push(action);
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_parts(self) -> (Option<String>, Vec<ActionData>) {
        (self.label, self.actions)
    }
}

impl From<ActionData> for Command {
    fn from(action: ActionData) -> Self {
        Command::new(action)
    }
}
