use crate::error::AppError;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const RELAY_URL_ENV_VAR: &str = "TODOAPP_RELAY_URL";

/// Outbound notification contract. One method, fire-and-forget semantics
/// are the caller's concern; implementations report a single attempt.
pub trait NotificationSender {
    fn send(&self, recipient_id: &str, text: &str) -> Result<(), AppError>;
}

pub struct NoopSender;

impl NotificationSender for NoopSender {
    fn send(&self, _recipient_id: &str, _text: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Sends notifications through the relay service's `/send-message`
/// endpoint. Single synchronous attempt, no retry.
pub struct RelaySender {
    base_url: String,
    agent: ureq::Agent,
}

impl RelaySender {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            agent: ureq::agent(),
        }
    }

    pub fn from_env() -> Option<Self> {
        let url = std::env::var(RELAY_URL_ENV_VAR).ok()?;
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self::new(trimmed))
    }

    fn endpoint(&self) -> String {
        format!("{}/send-message", self.base_url)
    }
}

impl NotificationSender for RelaySender {
    fn send(&self, recipient_id: &str, text: &str) -> Result<(), AppError> {
        let response = self.agent.post(&self.endpoint()).send_json(serde_json::json!({
            "recipientId": recipient_id,
            "message": text,
        }));

        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => {
                Err(AppError::notify(format!("relay returned status {code}")))
            }
            Err(err) => Err(AppError::notify(err.to_string())),
        }
    }
}

/// Local toast shown when the relay is unreachable. Platforms without a
/// supported backend simply have no fallback.
pub trait DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), AppError>;
}

pub fn desktop_notifier() -> Option<Box<dyn DesktopNotifier>> {
    if std::env::var("TODOAPP_DISABLE_DESKTOP_NOTIFICATIONS").is_ok() {
        return None;
    }
    platform_notifier()
}

#[cfg(target_os = "linux")]
fn platform_notifier() -> Option<Box<dyn DesktopNotifier>> {
    Some(Box::new(LinuxNotifier))
}

#[cfg(windows)]
fn platform_notifier() -> Option<Box<dyn DesktopNotifier>> {
    Some(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
fn platform_notifier() -> Option<Box<dyn DesktopNotifier>> {
    None
}
