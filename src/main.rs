use std::io::Write;

use somnus::config::{self, AppConfig};
use somnus::error::BridgeResult;
use somnus::server;
use somnus::server::appstate::AppState;

/*
 * Formatter function to output in syslog format. This makes sense when running
 * as a service (where output might go to a log file, or the system journal)
 */
#[allow(clippy::match_same_arms)]
fn syslog_format(
    buf: &mut pretty_env_logger::env_logger::fmt::Formatter,
    record: &log::Record,
) -> std::io::Result<()> {
    writeln!(
        buf,
        "<{}>{}: {}",
        match record.level() {
            log::Level::Error => 3,
            log::Level::Warn => 4,
            log::Level::Info => 6,
            log::Level::Debug => 7,
            log::Level::Trace => 7,
        },
        record.target(),
        record.args()
    )
}

fn init_logging() -> BridgeResult<()> {
    /* Try to provide reasonable default filters, when RUST_LOG is not specified */
    const DEFAULT_LOG_FILTERS: &[&str] = &["debug", "hyper_util=info", "reqwest=info"];

    let log_filters = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTERS.join(","));

    /* Detect if we need syslog or human-readable formatting */
    if std::env::var("SYSTEMD_EXEC_PID").is_ok_and(|pid| pid == std::process::id().to_string()) {
        Ok(pretty_env_logger::env_logger::builder()
            .format(syslog_format)
            .parse_filters(&log_filters)
            .try_init()?)
    } else {
        Ok(pretty_env_logger::formatted_timed_builder()
            .parse_filters(&log_filters)
            .try_init()?)
    }
}

/* An empty value is not fatal (the bridge simply stays idle), but it is
 * almost always a configuration mistake, so say so once at startup */
fn warn_empty_config(config: &AppConfig) {
    let required = [
        ("switchbot.token", config.switchbot.token.is_empty()),
        ("switchbot.secret", config.switchbot.secret.is_empty()),
        ("scenes.sleep", config.scenes.sleep.is_empty()),
        ("scenes.wake", config.scenes.wake.is_empty()),
        ("osc.parameter", config.osc.parameter.is_empty()),
    ];

    for (name, empty) in required {
        if empty {
            log::warn!("Configuration value [{name}] is empty");
        }
    }
}

async fn run() -> BridgeResult<()> {
    init_logging()?;

    let config = config::parse("config.yaml".into())?;
    log::debug!("Configuration loaded successfully");

    warn_empty_config(&config);

    let appstate = AppState::from_config(config);
    let listener = server::build_listener(&appstate);

    log::info!(
        "Watching [{}]",
        appstate.config().osc.watched_address()
    );

    tokio::select! {
        res = listener.run() => res,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Ctrl-C pressed, exiting..");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        log::error!("Somnus error: {err}");
        log::error!("Fatal error encountered, cannot continue.");
    }
}
