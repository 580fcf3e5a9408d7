//! File-backed app inventory.
//!
//! The inventory is a single JSON document:
//!
//! ```json
//! {
//!   "apps": { "/services/foo/app.yml": { "name": "foo", ... } },
//!   "jiraBoards": { "/teams/foo/jira/FOO.yml": { "name": "FOO", "url": "https://issues.example.com" } }
//! }
//! ```
//!
//! Board entries may also be lists of boards.

use crate::core::board::BoardLookup;
use crate::core::error::CheckpointError;
use crate::core::model::{AppRecord, Board};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoardEntry {
    One(Board),
    Many(Vec<Board>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryFile {
    #[serde(default)]
    apps: BTreeMap<String, Value>,
    #[serde(default)]
    jira_boards: BTreeMap<String, BoardEntry>,
}

#[derive(Debug, Default)]
pub struct FileInventory {
    apps: BTreeMap<String, Value>,
    boards: BTreeMap<String, Vec<Board>>,
}

impl FileInventory {
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CheckpointError::InventoryError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CheckpointError> {
        let file: InventoryFile = serde_json::from_str(content)?;
        for (path, app) in &file.apps {
            if !app.is_object() || AppRecord::new(app).name().is_empty() {
                return Err(CheckpointError::InventoryError(format!(
                    "app at {} has no name",
                    path
                )));
            }
        }
        let boards = file
            .jira_boards
            .into_iter()
            .map(|(path, entry)| match entry {
                BoardEntry::One(board) => (path, vec![board]),
                BoardEntry::Many(boards) => (path, boards),
            })
            .collect();
        Ok(Self {
            apps: file.apps,
            boards,
        })
    }

    /// Apps in inventory path order.
    pub fn apps(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.apps.iter().map(|(path, app)| (path.as_str(), app))
    }

    pub fn find_app(&self, name: &str) -> Result<(&str, &Value), CheckpointError> {
        self.apps()
            .find(|(_, app)| AppRecord::new(app).name() == name)
            .ok_or_else(|| CheckpointError::NotFound(format!("app {}", name)))
    }

    /// Resolves app names in the given order. Names with no matching app are
    /// returned separately so the caller can report them and go on.
    pub fn select_apps<'s>(
        &'s self,
        names: &[String],
    ) -> (Vec<(&'s str, &'s Value)>, Vec<CheckpointError>) {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.find_app(name) {
                Ok(target) => found.push(target),
                Err(e) => missing.push(e),
            }
        }
        (found, missing)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl BoardLookup for FileInventory {
    fn simple_jira_boards(&self, path: &str) -> Result<Vec<Board>, CheckpointError> {
        Ok(self.boards.get(path).cloned().unwrap_or_default())
    }
}
