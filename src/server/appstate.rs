use std::sync::Arc;

use switchbot::SwitchBot;

use crate::config::AppConfig;

/// Process-wide context, created once at startup and passed by reference.
#[derive(Clone)]
pub struct AppState {
    conf: Arc<AppConfig>,
    client: Arc<SwitchBot>,
}

impl AppState {
    #[must_use]
    pub fn from_config(config: AppConfig) -> Self {
        let client = Arc::new(SwitchBot::new(
            config.switchbot.token.clone(),
            config.switchbot.secret.clone(),
        ));

        Self {
            conf: Arc::new(config),
            client,
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        self.conf.clone()
    }

    #[must_use]
    pub fn client(&self) -> Arc<SwitchBot> {
        self.client.clone()
    }
}
