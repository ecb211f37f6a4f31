use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("build server returned status {status} for {path}")]
    RemoteQuery { status: u16, path: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed server document: {0}")]
    Document(String),

    #[error("siren protocol failure: {0}")]
    SirenProtocol(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
