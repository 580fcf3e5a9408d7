//! Tickets and the tracker interface the reconciler files them through.

use crate::core::error::CheckpointError;
use crate::core::model::{Board, Issue};
use serde::Serialize;

/// Labels attached to every checkpoint ticket. The tracker side uses them
/// (with the component) to spot duplicates.
pub const DEFAULT_CHECKPOINT_LABELS: &[&str] = &["sre-checkpoint"];

/// Whether the field was absent/empty or present with a bad value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Defect {
    Missing,
    Incorrect,
}

impl Defect {
    pub fn as_str(self) -> &'static str {
        match self {
            Defect::Missing => "Missing",
            Defect::Incorrect => "Incorrect",
        }
    }
}

pub fn ticket_summary(defect: Defect, field: &str, app_name: &str) -> String {
    format!("{} metadata {} for {}", defect.as_str(), field, app_name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub summary: String,
    pub body: String,
    pub labels: Vec<String>,
    pub links: Vec<String>,
}

impl Ticket {
    pub fn new(summary: String, body: String, parent: &str) -> Self {
        Self {
            summary,
            body,
            labels: DEFAULT_CHECKPOINT_LABELS
                .iter()
                .map(|l| l.to_string())
                .collect(),
            links: vec![parent.to_string()],
        }
    }
}

pub trait TicketingClient {
    fn create_issue(
        &self,
        summary: &str,
        body: &str,
        labels: &[String],
        links: &[String],
    ) -> Result<Issue, CheckpointError>;
}

/// Builds a client bound to one board.
pub trait TicketingConnector {
    fn connect(&self, board: &Board) -> Result<Box<dyn TicketingClient>, CheckpointError>;
}
