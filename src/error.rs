use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GriddleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("Migration step '{step}' failed: {message}")]
    MigrationStep { step: String, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Unsupported event class: {0}")]
    UnsupportedEventClass(String),
}

pub type Result<T> = std::result::Result<T, GriddleError>;

impl From<serde_json::Error> for GriddleError {
    fn from(e: serde_json::Error) -> Self {
        GriddleError::Json(e.to_string())
    }
}

impl From<reqwest::Error> for GriddleError {
    fn from(e: reqwest::Error) -> Self {
        GriddleError::BackendUnavailable(e.to_string())
    }
}

impl From<mongodb::error::Error> for GriddleError {
    fn from(e: mongodb::error::Error) -> Self {
        GriddleError::BackendUnavailable(e.to_string())
    }
}

impl GriddleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GriddleError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GriddleError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GriddleError::WriteRejected(_) => StatusCode::BAD_REQUEST,
            GriddleError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GriddleError::MigrationStep { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            GriddleError::Json(_) => StatusCode::BAD_REQUEST,
            GriddleError::UnsupportedEventClass(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// Axum IntoResponse implementation (feature-gated)
#[cfg(feature = "axum-support")]
impl axum::response::IntoResponse for GriddleError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": status.as_u16(),
            "error": self.to_string(),
            "data": {},
        });
        (status, axum::Json(body)).into_response()
    }
}
