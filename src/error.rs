use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

/// Failure of one fetch cycle. Nothing from a failed cycle is shown.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure (no status) or a non-success HTTP status.
    #[error("Transport error{}: {detail}", status_suffix(.status))]
    Transport { status: Option<u16>, detail: String },

    #[error("Unexpected payload shape: {0}")]
    MalformedPayload(String),

    #[error("Missing required columns in sheet: {}", .missing.join(", "))]
    Schema { missing: Vec<&'static str> },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Transport {
            status: e.status().map(|s| s.as_u16()),
            detail: e.to_string(),
        }
    }
}

/// Why a single row was dropped. Never leaves the parser.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row is empty")]
    Empty,
    #[error("competition id or participant name is blank")]
    BlankKey,
    #[error("competition id {0:?} is not YYYY-MM")]
    BadCompetitionId(String),
    #[error("participant name is blank")]
    BlankName,
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Pipeline(PipelineError::Configuration(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Leaderboard source is not configured".to_string(),
            ),
            AppError::Pipeline(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        HttpResponse::build(status).json(&serde_json::json!({ "error": message }))
    }
}
