use crate::error::RelayError;
use tracing::{debug, warn};

/// Messenger Send API client. One outbound call per send, no retry, no
/// queueing; the HTTP status decides success.
#[derive(Clone)]
pub struct MessengerClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl MessengerClient {
    pub fn new(api_base: impl Into<String>, access_token: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            api_base,
            access_token: access_token.into(),
        }
    }

    pub async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), RelayError> {
        let url = format!("{}/me/messages", self.api_base);
        let body = serde_json::json!({
            "recipient": { "id": recipient_id },
            "message": { "text": text },
        });

        debug!("sending messenger message to {recipient_id}");
        let response = self
            .http
            .post(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("messenger send rejected ({status}): {detail}");
            return Err(RelayError::ProviderStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
