/// Simplified error system - one enum for the whole chart app.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// A feed payload that could not be turned into a candle.
    DecodeError(String),
    /// Transport-level failure of a subscription.
    NetworkError(String),
    /// Chart surface failed to initialize or draw.
    RenderingError(String),
    ValidationError(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::DecodeError(msg) => write!(f, "Decode Error: {}", msg),
            AppError::NetworkError(msg) => write!(f, "Network Error: {}", msg),
            AppError::RenderingError(msg) => write!(f, "Rendering Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DecodeError(err.to_string())
    }
}

// Simple convenience type aliases
pub type DecodeResult<T> = Result<T, AppError>;
pub type NetworkResult<T> = Result<T, AppError>;
pub type RenderingResult<T> = Result<T, AppError>;
