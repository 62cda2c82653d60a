//! Weather and geocoding error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// Connection failure, timeout, or an unreadable response body
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream answered successfully but the payload is missing a required field
    #[error("Unexpected upstream payload: {0}")]
    Format(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl WeatherError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Whether the upstream call itself failed (transport or status).
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }

    pub fn is_format_failure(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) if e.is_timeout() => {
                "The weather service took too long to respond. Please try again.".to_string()
            }
            Self::Network(_) => "Unable to reach the weather service. Check your connection.".to_string(),
            Self::Status { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later.".to_string()
            }
            Self::Status { status, .. } => format!("The weather service rejected the request ({}).", status),
            Self::Format(_) => "Received an unexpected response from the weather service.".to_string(),
            Self::LocationNotFound(_) => "Location not found for query.".to_string(),
            Self::InvalidRequest(msg) => msg.clone(),
        }
    }
}
