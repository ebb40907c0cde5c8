use crate::error::AppError;
use crate::notify::DesktopNotifier;
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl DesktopNotifier for WindowsNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(summary)
            .text1(body)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
