use thiserror::Error;

use switchbot::error::SwitchBotError;

#[derive(Error, Debug)]
pub enum BridgeError {
    /* mapped errors */
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),

    #[error(transparent)]
    SetLoggerError(#[from] log::SetLoggerError),

    #[error(transparent)]
    SwitchBotError(#[from] SwitchBotError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
