//! Run settings loaded from `checkpoint.toml`.
//!
//! Every key is optional. Secrets are read from the environment variable named
//! by `jira.token_env`; an inline `jira.token` is the fallback.

use crate::core::error::CheckpointError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "checkpoint.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Ticket template; the bundled one when unset.
    pub template: Option<PathBuf>,
    pub jira: JiraSettings,
    pub probe: ProbeSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JiraSettings {
    pub token_env: String,
    pub token: Option<String>,
    pub issue_type: String,
    pub link_type: String,
    pub timeout_secs: u64,
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            token_env: "JIRA_TOKEN".to_string(),
            token: None,
            issue_type: "Task".to_string(),
            link_type: "Relates".to_string(),
            timeout_secs: 30,
        }
    }
}

impl JiraSettings {
    pub fn resolve_token(&self) -> Result<String, CheckpointError> {
        if !self.token_env.is_empty() {
            if let Ok(token) = std::env::var(&self.token_env) {
                if !token.trim().is_empty() {
                    return Ok(token.trim().to_string());
                }
            }
        }
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(CheckpointError::ConfigError(format!(
                "no Jira token: set {} or jira.token",
                self.token_env
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("sre-checkpoint/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

pub fn parse_settings(content: &str) -> Result<Settings, CheckpointError> {
    toml::from_str(content).map_err(|e| CheckpointError::ConfigError(e.to_string()))
}

/// Load settings from an explicit path, or from `./checkpoint.toml` when it
/// exists. An explicit path that does not exist is an error.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, CheckpointError> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CheckpointError::ConfigError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(Settings::default());
            }
            fallback
        }
    };
    let content = fs::read_to_string(&path).map_err(CheckpointError::IoError)?;
    let mut settings = parse_settings(&content)?;
    // Relative template paths are anchored at the config file.
    if let (Some(template), Some(dir)) = (settings.template.as_mut(), path.parent()) {
        if template.is_relative() {
            *template = dir.join(&*template);
        }
    }
    Ok(settings)
}
