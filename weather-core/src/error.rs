use thiserror::Error;

/// Why a weather lookup did not produce a view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Search text is empty")]
    EmptyQuery,

    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    #[error("Failed to fetch weather data: {0}")]
    NetworkOrParse(String),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkOrParse(message.into())
    }

    pub fn not_found(query: impl Into<String>) -> Self {
        Self::LocationNotFound { query: query.into() }
    }

    /// Message shown to the user in place of the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::EmptyQuery => "Please enter a city name".to_string(),
            FetchError::InvalidCoordinates { .. } => {
                "Your location could not be determined".to_string()
            }
            FetchError::LocationNotFound { .. } => "City not found".to_string(),
            FetchError::NetworkOrParse(_) => {
                "Unable to fetch weather data. Please check your connection and try again."
                    .to_string()
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::NetworkOrParse(format!("request timed out: {err}"))
        } else {
            FetchError::NetworkOrParse(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::NetworkOrParse(format!("malformed response: {err}"))
    }
}
