use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitchBotError {
    /* mapped errors */
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /* transport errors */
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    /* api errors */
    #[error("API error {status_code}: {message}")]
    Api { status_code: i64, message: String },
}

pub type SwitchBotResult<T> = Result<T, SwitchBotError>;
