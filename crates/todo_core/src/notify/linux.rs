use crate::error::AppError;
use crate::notify::DesktopNotifier;
use notify_rust::Notification;

pub struct LinuxNotifier;

impl DesktopNotifier for LinuxNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), AppError> {
        Notification::new()
            .summary(summary)
            .body(body)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
