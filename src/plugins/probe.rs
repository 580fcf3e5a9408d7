use crate::core::config::ProbeSettings;
use crate::core::error::CheckpointError;
use crate::core::validate::HttpProbe;
use std::time::Duration;

/// Blocking GET probe. Redirects are followed; whatever status the server ends
/// on is reported, including 4xx and 5xx.
pub struct UreqProbe {
    agent: ureq::Agent,
}

impl UreqProbe {
    pub fn new(settings: &ProbeSettings) -> Self {
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(&settings.user_agent)
            .build();
        Self { agent }
    }
}

impl Default for UreqProbe {
    fn default() -> Self {
        Self::new(&ProbeSettings::default())
    }
}

impl HttpProbe for UreqProbe {
    fn status(&self, url: &str) -> Result<u16, CheckpointError> {
        match self.agent.get(url).call() {
            Ok(resp) => Ok(resp.status()),
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(ureq::Error::Transport(transport)) => {
                tracing::debug!(url, error = %transport, "probe transport failure");
                Err(CheckpointError::HttpError(format!("{}: {}", url, transport)))
            }
        }
    }
}
