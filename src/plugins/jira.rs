//! Jira REST v2 ticketing client.
//!
//! One client is bound to one board: the board name is the project key and the
//! board URL is the server base URL. Authentication is a bearer token
//! (personal access token).

use crate::core::config::JiraSettings;
use crate::core::error::CheckpointError;
use crate::core::model::{Board, Issue};
use crate::core::output;
use crate::core::ticket::{TicketingClient, TicketingConnector};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

const ERROR_BODY_CHARS: usize = 200;

pub struct JiraConnector {
    settings: JiraSettings,
}

impl JiraConnector {
    pub fn new(settings: JiraSettings) -> Self {
        Self { settings }
    }
}

impl TicketingConnector for JiraConnector {
    fn connect(&self, board: &Board) -> Result<Box<dyn TicketingClient>, CheckpointError> {
        Ok(Box::new(JiraClient::new(board, &self.settings)?))
    }
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

pub struct JiraClient {
    agent: ureq::Agent,
    base_url: String,
    project: String,
    auth_header: String,
    issue_type: String,
    link_type: String,
}

impl JiraClient {
    pub fn new(board: &Board, settings: &JiraSettings) -> Result<Self, CheckpointError> {
        if board.url.trim().is_empty() {
            return Err(CheckpointError::ConfigError(format!(
                "board {} has no server URL",
                board.name
            )));
        }
        let token = settings.resolve_token()?;
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();

        Ok(Self {
            agent,
            base_url: board.url.trim_end_matches('/').to_string(),
            project: board.name.clone(),
            auth_header: format!("Bearer {}", token),
            issue_type: settings.issue_type.clone(),
            link_type: settings.link_type.clone(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn post(&self, path: &str, payload: Value) -> Result<ureq::Response, CheckpointError> {
        let url = format!("{}{}", self.base_url, path);
        match self
            .agent
            .post(&url)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json")
            .send_json(payload)
        {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(CheckpointError::TicketingError(format!(
                    "HTTP {} from {}: {}",
                    code,
                    path,
                    output::compact_value(&body, ERROR_BODY_CHARS)
                )))
            }
            Err(ureq::Error::Transport(transport)) => Err(CheckpointError::TicketingError(
                format!("{}: {}", url, transport),
            )),
        }
    }

    fn link(&self, issue: &str, parent: &str) -> Result<(), CheckpointError> {
        self.post(
            "/rest/api/2/issueLink",
            json!({
                "type": {"name": self.link_type},
                "inwardIssue": {"key": issue},
                "outwardIssue": {"key": parent},
            }),
        )?;
        Ok(())
    }
}

impl TicketingClient for JiraClient {
    fn create_issue(
        &self,
        summary: &str,
        body: &str,
        labels: &[String],
        links: &[String],
    ) -> Result<Issue, CheckpointError> {
        let resp = self.post(
            "/rest/api/2/issue",
            json!({
                "fields": {
                    "project": {"key": self.project},
                    "summary": summary,
                    "description": body,
                    "issuetype": {"name": self.issue_type},
                    "labels": labels,
                }
            }),
        )?;
        let created: CreatedIssue = resp.into_json().map_err(|e| {
            CheckpointError::TicketingError(format!("unreadable create response: {}", e))
        })?;

        for parent in links {
            // The issue already exists; link failures are only logged.
            if let Err(e) = self.link(&created.key, parent) {
                tracing::warn!(issue = %created.key, parent = %parent, error = %e, "could not link issue");
            }
        }

        Ok(Issue {
            url: Some(format!("{}/browse/{}", self.base_url, created.key)),
            key: created.key,
        })
    }
}
