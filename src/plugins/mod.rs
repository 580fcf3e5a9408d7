//! Concrete collaborators: HTTP probe, Jira client and the file inventory.

pub mod inventory;
pub mod jira;
pub mod probe;
