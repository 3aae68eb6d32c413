use std::net::Ipv4Addr;

use camino::Utf8Path;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::BridgeResult;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub switchbot: SwitchBotConfig,

    #[serde(default)]
    pub scenes: SceneConfig,

    #[serde(default)]
    pub osc: OscConfig,
}

/// Credentials for the SwitchBot cloud API.
#[derive(Clone, Default, Deserialize)]
pub struct SwitchBotConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub secret: String,
}

impl std::fmt::Debug for SwitchBotConfig {
    /* credentials must never end up in logs */
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchBotConfig").finish_non_exhaustive()
    }
}

/// Scene ids executed on parameter transitions.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub sleep: String,

    #[serde(default)]
    pub wake: String,
}

/// Listen surface for incoming OSC datagrams.
#[derive(Clone, Debug, Deserialize)]
pub struct OscConfig {
    #[serde(default = "default_host")]
    pub host: Ipv4Addr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Avatar parameter name watched for boolean transitions.
    #[serde(default)]
    pub parameter: String,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            parameter: String::new(),
        }
    }
}

impl OscConfig {
    /// Full OSC address of the watched avatar parameter.
    #[must_use]
    pub fn watched_address(&self) -> String {
        format!("/avatar/parameters/{}", self.parameter)
    }
}

const fn default_host() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}

const fn default_port() -> u16 {
    9001
}

pub fn parse(filename: &Utf8Path) -> BridgeResult<AppConfig> {
    let config = Config::builder()
        .add_source(File::with_name(filename.as_str()).required(false))
        .add_source(
            Environment::with_prefix("somnus")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
