use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Map a non-success status and body text to an error variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => ApiError::NotFound(body),
            401 => ApiError::Unauthorized(body),
            400 => ApiError::BadRequest(body),
            _ => ApiError::Api(body),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
