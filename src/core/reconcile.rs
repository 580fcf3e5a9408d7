//! Per-app reconciliation: validate every registered field and cut one ticket
//! (or one dry-run render) per bad field.
//!
//! # Failure handling
//!
//! - Board resolution and client connection failures abort the app in live
//!   mode, before any ticket is filed. Dry runs only warn about them.
//! - Template failures abort the app in both modes.
//! - A validator that cannot check a value still produces a ticket.
//! - A tracker error while filing one field is logged and recorded; the
//!   remaining fields are still processed.

use crate::core::board::{BoardLookup, BoardOverride, resolve_board};
use crate::core::error::CheckpointError;
use crate::core::model::{AppRecord, Board, Issue, bad_value_text, is_truthy};
use crate::core::output;
use crate::core::render::{TicketRenderer, TicketVars};
use crate::core::ticket::{Defect, Ticket, TicketingClient, TicketingConnector, ticket_summary};
use crate::core::validate::{ValidatorRegistry, Verdict};
use serde::Serialize;
use serde_json::Value;
use ulid::Ulid;

const LOG_VALUE_CHARS: usize = 120;

/// How bad fields are reported. Chosen once per invocation.
#[derive(Clone, Copy)]
pub enum Mode<'a> {
    /// Render and log ticket bodies; never talk to the tracker.
    DryRun,
    /// Render and file tickets through a client built for the resolved board.
    Live(&'a dyn TicketingConnector),
}

impl Mode<'_> {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Mode::DryRun)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FieldOutcome {
    Passed {
        field: String,
    },
    Rendered {
        field: String,
        defect: Defect,
        summary: String,
        body: String,
    },
    Filed {
        field: String,
        defect: Defect,
        summary: String,
        issue: Issue,
    },
    FilingFailed {
        field: String,
        defect: Defect,
        summary: String,
        error: String,
    },
}

impl FieldOutcome {
    pub fn field(&self) -> &str {
        match self {
            FieldOutcome::Passed { field }
            | FieldOutcome::Rendered { field, .. }
            | FieldOutcome::Filed { field, .. }
            | FieldOutcome::FilingFailed { field, .. } => field,
        }
    }

    pub fn is_bad(&self) -> bool {
        !matches!(self, FieldOutcome::Passed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub run_id: String,
    pub app: String,
    pub app_path: String,
    pub dry_run: bool,
    pub board: Option<Board>,
    pub outcomes: Vec<FieldOutcome>,
}

impl ReconcileReport {
    pub fn bad_fields(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.is_bad())
            .map(|o| o.field().to_string())
            .collect()
    }

    pub fn filed(&self) -> Vec<&Issue> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                FieldOutcome::Filed { issue, .. } => Some(issue),
                _ => None,
            })
            .collect()
    }

    pub fn rendered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FieldOutcome::Rendered { .. }))
            .count()
    }

    pub fn filing_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FieldOutcome::FilingFailed { .. }))
            .count()
    }
}

/// Everything a checkpoint run needs besides the app itself.
pub struct Reconciler<'a> {
    pub registry: &'a ValidatorRegistry,
    pub renderer: &'a TicketRenderer,
    pub lookup: &'a dyn BoardLookup,
    pub overrides: BoardOverride,
    pub parent: String,
    pub mode: Mode<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        registry: &'a ValidatorRegistry,
        renderer: &'a TicketRenderer,
        lookup: &'a dyn BoardLookup,
        parent: &str,
        mode: Mode<'a>,
    ) -> Self {
        Self {
            registry,
            renderer,
            lookup,
            overrides: BoardOverride::default(),
            parent: parent.to_string(),
            mode,
        }
    }

    pub fn with_overrides(mut self, overrides: BoardOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// Checks every registered field of `app` and reports the bad ones.
    pub fn reconcile(
        &self,
        app: &Value,
        app_path: &str,
    ) -> Result<ReconcileReport, CheckpointError> {
        let record = AppRecord::new(app);
        let app_name = record.name();
        let run_id = Ulid::new().to_string();
        let span = tracing::info_span!("reconcile", app = app_name, run_id = %run_id);
        let _guard = span.enter();

        let (board, client) = self.prepare(&record)?;

        let mut outcomes = Vec::with_capacity(self.registry.len());
        for (field, validator) in self.registry.iter() {
            let value = record.field(field);
            match validator.check(value) {
                Verdict::Valid => {
                    tracing::debug!(field, "field passed");
                    outcomes.push(FieldOutcome::Passed {
                        field: field.to_string(),
                    });
                    continue;
                }
                Verdict::Invalid => {}
                Verdict::Error(detail) => {
                    tracing::error!(field, app = app_name, error = %detail, "problems validating field");
                }
            }
            let outcome = self.report_bad_field(&record, app_path, field, value, client.as_deref())?;
            outcomes.push(outcome);
        }

        Ok(ReconcileReport {
            run_id,
            app: app_name.to_string(),
            app_path: app_path.to_string(),
            dry_run: self.mode.is_dry_run(),
            board,
            outcomes,
        })
    }

    fn prepare(
        &self,
        record: &AppRecord<'_>,
    ) -> Result<(Option<Board>, Option<Box<dyn TicketingClient>>), CheckpointError> {
        let resolved = resolve_board(record.board().as_ref(), &self.overrides, self.lookup);
        match self.mode {
            Mode::Live(connector) => {
                let board = resolved?;
                tracing::info!(board = %board.name, url = %board.url, "filing against board");
                let client = connector.connect(&board)?;
                Ok((Some(board), Some(client)))
            }
            Mode::DryRun => match resolved {
                Ok(board) => Ok((Some(board), None)),
                Err(e) => {
                    tracing::warn!(error = %e, "no board resolved; a live run would abort here");
                    Ok((None, None))
                }
            },
        }
    }

    fn report_bad_field(
        &self,
        record: &AppRecord<'_>,
        app_path: &str,
        field: &str,
        value: Option<&Value>,
        client: Option<&dyn TicketingClient>,
    ) -> Result<FieldOutcome, CheckpointError> {
        let app_name = record.name();
        let defect = if is_truthy(value) {
            Defect::Incorrect
        } else {
            Defect::Missing
        };
        let bad_value = bad_value_text(value);
        let summary = ticket_summary(defect, field, app_name);
        let body = self.renderer.render(&TicketVars {
            app_name,
            app_path,
            field,
            field_value: &bad_value,
        })?;
        let shown = output::compact_value(&bad_value, LOG_VALUE_CHARS);

        let Some(client) = client else {
            tracing::info!(field, value = %shown, summary = %summary, "dry run, would file:\n{}", body);
            return Ok(FieldOutcome::Rendered {
                field: field.to_string(),
                defect,
                summary,
                body,
            });
        };

        let ticket = Ticket::new(summary, body, &self.parent);
        match client.create_issue(&ticket.summary, &ticket.body, &ticket.labels, &ticket.links) {
            Ok(issue) => {
                tracing::error!(field, value = %shown, issue = %issue, "reporting bad field");
                Ok(FieldOutcome::Filed {
                    field: field.to_string(),
                    defect,
                    summary: ticket.summary,
                    issue,
                })
            }
            Err(e) => {
                tracing::error!(field, value = %shown, error = %e, "filing ticket failed, moving on");
                Ok(FieldOutcome::FilingFailed {
                    field: field.to_string(),
                    defect,
                    summary: ticket.summary,
                    error: e.to_string(),
                })
            }
        }
    }
}
