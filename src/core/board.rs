//! Destination board resolution.
//!
//! Operators can redirect an app's tickets with an override pair: a board path
//! in the inventory plus the project name to file under. The pair only takes
//! effect when both halves are present; then it wins over whatever the app
//! declares. An incomplete pair is ignored when the app has its own board and
//! is fatal when it doesn't.

use crate::core::error::CheckpointError;
use crate::core::model::Board;

/// Looks boards up by inventory path. An empty result means "not found".
pub trait BoardLookup {
    fn simple_jira_boards(&self, path: &str) -> Result<Vec<Board>, CheckpointError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardOverride {
    pub name: Option<String>,
    pub path: Option<String>,
}

impl BoardOverride {
    pub fn new(name: Option<&str>, path: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            path: path.map(str::to_string),
        }
    }

    fn pair(&self) -> Option<(&str, &str)> {
        match (self.name.as_deref(), self.path.as_deref()) {
            (Some(name), Some(path)) if !name.is_empty() && !path.is_empty() => Some((name, path)),
            _ => None,
        }
    }
}

pub fn resolve_board(
    app_board: Option<&Board>,
    overrides: &BoardOverride,
    lookup: &dyn BoardLookup,
) -> Result<Board, CheckpointError> {
    if let Some((name, path)) = overrides.pair() {
        let mut boards = lookup.simple_jira_boards(path)?;
        if boards.is_empty() {
            return Err(CheckpointError::UnusableOverride {
                path: path.to_string(),
            });
        }
        let mut board = boards.swap_remove(0);
        board.name = name.to_string();
        return Ok(board);
    }

    match app_board {
        Some(board) => Ok(board.clone()),
        None => Err(CheckpointError::NowhereToReport(nowhere_message(overrides))),
    }
}

fn nowhere_message(overrides: &BoardOverride) -> String {
    let mut msg = String::from("Missing JIRA information from the service.");
    if overrides.path.as_deref().is_none_or(str::is_empty) {
        msg.push_str(" You need to specify a path to a JIRA board in the inventory.");
    }
    if overrides.name.as_deref().is_none_or(str::is_empty) {
        msg.push_str(" You need to specify a board name.");
    }
    msg
}
