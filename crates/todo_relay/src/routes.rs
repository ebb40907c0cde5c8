use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::messenger::MessengerClient;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

/// Read-only state shared by all handlers. No locks; the client and
/// tokens are fixed at startup.
#[derive(Clone)]
pub struct AppState {
    verify_token: String,
    page_token_preview: Option<String>,
    client: Option<MessengerClient>,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Self {
        let client = config
            .page_access_token
            .as_deref()
            .map(|token| MessengerClient::new(config.graph_api_base.clone(), token));
        Self {
            verify_token: config.verify_token.clone(),
            page_token_preview: config.page_token_preview(),
            client,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook).post(receive_event))
        .route("/send-message", post(send_message))
        .with_state(state)
}

#[derive(Deserialize)]
struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> impl IntoResponse {
    let mode = query.mode.unwrap_or_default();
    let token = query.verify_token.unwrap_or_default();

    if mode == "subscribe" && token == state.verify_token {
        info!("webhook verification succeeded");
        (StatusCode::OK, query.challenge.unwrap_or_default()).into_response()
    } else {
        warn!("webhook verification failed");
        (StatusCode::FORBIDDEN, "verification failed").into_response()
    }
}

async fn receive_event(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    if payload.get("object").and_then(serde_json::Value::as_str) != Some("page") {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "unrecognized event object" })),
        )
            .into_response();
    }

    for event in messaging_events(&payload) {
        // This is the id the user copies into the app's settings.
        info!("inbound sender id: {}", event.sender_id);

        let Some(text) = &event.text else { continue };
        info!("inbound message text: {text}");

        let Some(client) = &state.client else {
            warn!("cannot send welcome reply, page access token is not configured");
            continue;
        };
        let reply = welcome_reply(&event.sender_id);
        if let Err(err) = client.send_text(&event.sender_id, &reply).await {
            warn!("welcome reply failed: {err}");
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "received" })),
    )
        .into_response()
}

struct MessagingEvent {
    sender_id: String,
    text: Option<String>,
}

/// Unwrap `entry[].messaging[]` sub-events that carry a sender id.
fn messaging_events(payload: &serde_json::Value) -> Vec<MessagingEvent> {
    let mut events = Vec::new();
    let Some(entries) = payload.get("entry").and_then(serde_json::Value::as_array) else {
        return events;
    };

    for entry in entries {
        let Some(messaging) = entry.get("messaging").and_then(serde_json::Value::as_array)
        else {
            continue;
        };

        for event in messaging {
            let Some(sender_id) = event
                .get("sender")
                .and_then(|sender| sender.get("id"))
                .and_then(serde_json::Value::as_str)
                .filter(|id| !id.is_empty())
            else {
                continue;
            };

            let text = event
                .get("message")
                .and_then(|message| message.get("text"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);

            events.push(MessagingEvent {
                sender_id: sender_id.to_string(),
                text,
            });
        }
    }

    events
}

fn welcome_reply(sender_id: &str) -> String {
    format!(
        "Thanks for messaging the to-do bot! Your recipient id is {sender_id}. \
         Paste it into the app's notification settings to receive reminders."
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest {
    #[serde(default)]
    recipient_id: String,
    #[serde(default)]
    message: String,
}

async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<serde_json::Value>, RelayError> {
    if request.recipient_id.trim().is_empty() {
        return Err(RelayError::MissingField("recipientId"));
    }
    if request.message.trim().is_empty() {
        return Err(RelayError::MissingField("message"));
    }

    let client = state.client.as_ref().ok_or(RelayError::MissingCredential)?;
    client
        .send_text(request.recipient_id.trim(), request.message.trim())
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "page_token_configured": state.client.is_some(),
        "verify_token_configured": !state.verify_token.is_empty(),
        "page_token_preview": state.page_token_preview,
    }))
}
