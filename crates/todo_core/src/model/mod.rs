mod settings;
mod task;

pub use settings::{ResetTime, Settings, SettingsPatch};
pub use task::Task;
