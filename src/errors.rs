use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The envelope came back with a non-200 `code` on a successful transport.
    #[error("application error {code}: {message}")]
    Application { code: i64, message: String },
    /// HTTP error status that is not a refreshable 401.
    #[error("http {status}: {message}")]
    Transport { status: StatusCode, message: String },
    /// No response reached us (connect failure, timeout, broken body).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// A 401 that refreshing could not resolve.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport { status, .. } => Some(*status),
            Error::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}
