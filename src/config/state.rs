// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::pinger::DaemonPinger;

/// Application state
pub struct AppState {
    pub config: Config,
    pub pinger: DaemonPinger,
}

impl AppState {
    /// Create `AppState`, building the outbound HTTP client once for the process
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let pinger = DaemonPinger::new(config.pinger.region.clone())?;

        Ok(Self {
            config: config.clone(),
            pinger,
        })
    }

    /// Test state with a caller-built pinger and access logging switched off
    #[cfg(test)]
    pub fn with_pinger(config: &Config, pinger: DaemonPinger) -> Self {
        let mut config = config.clone();
        config.logging.access_log = false;
        Self { config, pinger }
    }

    #[cfg(test)]
    pub fn region(&self) -> Option<&str> {
        self.pinger.region()
    }
}
