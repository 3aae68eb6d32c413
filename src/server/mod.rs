pub mod appstate;
pub mod dispatcher;
pub mod osc;

use std::sync::Arc;

use crate::server::appstate::AppState;
use crate::server::dispatcher::SceneDispatcher;
use crate::server::osc::OscListener;

/// Wire the scene dispatcher onto an OSC listener for the configured
/// parameter address.
#[must_use]
pub fn build_listener(appstate: &AppState) -> OscListener {
    let conf = appstate.config();

    let dispatcher = SceneDispatcher::new(
        appstate.client(),
        conf.scenes.sleep.clone(),
        conf.scenes.wake.clone(),
    );

    let mut listener = OscListener::new(conf.osc.host, conf.osc.port);
    listener.subscribe(conf.osc.watched_address(), Arc::new(dispatcher));

    listener
}
