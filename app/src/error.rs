use std::fmt;

#[derive(Debug)]
pub enum BookingError {
    Http(reqwest::Error),
    Parse(String),
    Config(String),
    ServiceUnavailable,
    InvalidResponse(String),
    Auth(String),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Parse(e) => write!(f, "JSON parse error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::ServiceUnavailable => write!(f, "Service temporarily unavailable (503)"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            Self::Auth(msg) => write!(f, "Authentication error: {msg}"),
        }
    }
}

impl std::error::Error for BookingError {}

impl BookingError {
    /// The backend rejected an email/password pair it does not know.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::Auth(msg) if msg.contains("Invalid login credentials"))
    }

    /// Error for a non-success status on a data request.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            Self::ServiceUnavailable
        } else {
            Self::InvalidResponse(format!("HTTP {status} for {context}"))
        }
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::SERVICE_UNAVAILABLE) {
            Self::ServiceUnavailable
        } else {
            Self::Http(e)
        }
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
