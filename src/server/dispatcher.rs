use std::sync::Arc;

use async_trait::async_trait;
use rosc::{OscMessage, OscType};

use switchbot::SwitchBot;
use switchbot::api::Envelope;
use switchbot::error::SwitchBotResult;

use crate::server::osc::OscHandler;

/// Seam between the dispatcher and the API client.
#[async_trait]
pub trait SceneExecutor: Send + Sync {
    async fn execute_scene(&self, scene_id: &str) -> SwitchBotResult<Envelope>;
}

#[async_trait]
impl SceneExecutor for SwitchBot {
    async fn execute_scene(&self, scene_id: &str) -> SwitchBotResult<Envelope> {
        Self::execute_scene(self, scene_id).await
    }
}

struct SceneTarget {
    id: String,
    label: &'static str,
}

/// Maps one watched boolean avatar parameter onto two scenes:
/// `true` puts the home to sleep, `false` wakes it up.
pub struct SceneDispatcher {
    client: Arc<dyn SceneExecutor>,
    sleep: SceneTarget,
    wake: SceneTarget,
}

impl SceneDispatcher {
    #[must_use]
    pub fn new(client: Arc<dyn SceneExecutor>, sleep_scene: String, wake_scene: String) -> Self {
        Self {
            client,
            sleep: SceneTarget {
                id: sleep_scene,
                label: "sleep",
            },
            wake: SceneTarget {
                id: wake_scene,
                label: "wake",
            },
        }
    }

    const fn select(&self, value: bool) -> &SceneTarget {
        if value { &self.sleep } else { &self.wake }
    }

    /// One scene execution attempt per event. Failures are logged and
    /// contained here; a lost call must not take the dispatcher down.
    async fn trigger(&self, value: bool) {
        let target = self.select(value);

        match self.client.execute_scene(&target.id).await {
            Ok(_) => log::info!("Scene [{}]: success", target.label),
            Err(err) => {
                log::error!("{err}");
                log::error!("Scene [{}]: failure", target.label);
            }
        }
    }
}

#[async_trait]
impl OscHandler for SceneDispatcher {
    async fn handle(&self, message: OscMessage) {
        match message.args.first() {
            Some(OscType::Bool(value)) => self.trigger(*value).await,
            _ => log::error!("Watched parameter must carry a Bool argument"),
        }
    }
}
