use thiserror::Error;

pub type Result<T> = std::result::Result<T, NeoWsError>;

#[derive(Debug, Error)]
pub enum NeoWsError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid endpoint URL: {0}")]
    Url(String),
}

impl NeoWsError {
    /// Upstream HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NeoWsError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NeoWsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NeoWsError::Timeout
        } else {
            NeoWsError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NeoWsError {
    fn from(err: serde_json::Error) -> Self {
        NeoWsError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_for_api_errors() {
        let api = NeoWsError::Api {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(api.status(), Some(404));
        assert_eq!(NeoWsError::Timeout.status(), None);
        assert_eq!(NeoWsError::Network("reset".into()).status(), None);
    }

    #[test]
    fn json_errors_classify_as_parse() {
        let err: NeoWsError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, NeoWsError::Parse(_)));
    }
}
