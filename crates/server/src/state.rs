use std::sync::Arc;

use fleetsafe_core::{Config, FleetData, MissionManager, SanitizedConfig, ScoringConfig};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    manager: Arc<MissionManager>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        manager: Arc<MissionManager>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            manager,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get sanitized config (secrets redacted)
    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn manager(&self) -> &Arc<MissionManager> {
        &self.manager
    }

    /// The dataset every mission and score endpoint reads.
    pub fn data(&self) -> &dyn FleetData {
        self.manager.orchestrator().data().as_ref()
    }

    pub fn scoring(&self) -> &ScoringConfig {
        self.manager.orchestrator().scoring()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
