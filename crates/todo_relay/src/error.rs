use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Relay failure taxonomy. Caller-facing messages stay generic for
/// provider failures; detail goes to the log only.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("page access token is not configured")]
    MissingCredential,

    #[error("provider rejected the send (status {status})")]
    ProviderStatus { status: u16 },

    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::ProviderStatus { .. } | Self::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("{field} is required"),
            Self::MissingCredential => "page access token is not configured".to_string(),
            Self::ProviderStatus { .. } | Self::Transport(_) => "failed to send".to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}
