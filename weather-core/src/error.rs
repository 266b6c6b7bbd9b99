use thiserror::Error;

/// Failures talking to a weather or geocoding API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

/// What the dashboard shows instead of data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("weather service unavailable: {0}")]
    NetworkUnavailable(#[from] ProviderError),

    #[error("no search result found for '{query}'")]
    NoResults { query: String },
}

impl DashboardError {
    /// Message suitable for the error panel.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable(_) => {
                "We couldn't connect to the server (API error). Please try again in a few moments."
            }
            Self::NoResults { .. } => "No search result found!",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }
}
