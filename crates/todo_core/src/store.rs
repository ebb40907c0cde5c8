use crate::error::AppError;
use crate::model::{Settings, SettingsPatch, Task};
use crate::notify::{DesktopNotifier, NotificationSender};
use crate::storage::{KeyValueStore, SETTINGS_KEY, TASKS_KEY};
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Reminder decision produced by [`TaskStore::check_reminder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub incomplete: usize,
    pub hours_until_reset: i64,
}

/// Owns the task list and settings, applies mutations, persists them
/// write-through, and evaluates the three time-driven rules (daily reset,
/// reminder eligibility, completion celebration).
///
/// All methods take the current instant from the caller; nothing in here
/// reads the wall clock, so tests drive the evaluators with fabricated
/// times.
pub struct TaskStore {
    tasks: Vec<Task>,
    settings: Settings,
    celebrated: bool,
    storage: Box<dyn KeyValueStore>,
    sender: Box<dyn NotificationSender>,
    fallback: Option<Box<dyn DesktopNotifier>>,
}

impl TaskStore {
    /// Load state from storage, falling back to defaults when entries are
    /// missing or unreadable. `today` seeds `last_reset_date` on first run.
    pub fn open(
        storage: Box<dyn KeyValueStore>,
        sender: Box<dyn NotificationSender>,
        today: Date,
    ) -> Result<Self, AppError> {
        let tasks = load_tasks(storage.as_ref())?;
        let settings = load_settings(storage.as_ref(), today)?;
        Ok(Self {
            tasks,
            settings,
            celebrated: false,
            storage,
            sender,
            fallback: None,
        })
    }

    pub fn with_desktop_fallback(mut self, fallback: Option<Box<dyn DesktopNotifier>>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn incomplete_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }

    /// Append a new task. Empty-after-trim text is a silent no-op.
    pub fn add_task(
        &mut self,
        text: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Task>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let task = Task::new(self.next_task_id(now), trimmed, now);
        self.tasks.push(task.clone());
        self.save_tasks()?;
        self.notify_best_effort(&format!("New task added: {}", task.text));
        Ok(Some(task))
    }

    /// Flip completion for `id`. Unknown ids are a no-op, not an error.
    pub fn toggle_task(
        &mut self,
        id: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Task>, AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };

        task.completed = !task.completed;
        task.updated_at = now;
        let snapshot = task.clone();

        self.save_tasks()?;
        if snapshot.completed {
            self.notify_best_effort(&format!("Task completed: {}", snapshot.text));
        }
        Ok(Some(snapshot))
    }

    /// Replace the text of `id`. Unknown ids and empty replacement text
    /// are no-ops.
    pub fn update_task(
        &mut self,
        id: &str,
        new_text: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Task>, AppError> {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };

        task.text = trimmed.to_string();
        task.updated_at = now;
        let snapshot = task.clone();

        self.save_tasks()?;
        Ok(Some(snapshot))
    }

    /// Remove the task with `id`. Unknown ids are a no-op.
    pub fn delete_task(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return Ok(None);
        };

        let removed = self.tasks.remove(index);
        self.save_tasks()?;
        Ok(Some(removed))
    }

    /// Shallow-merge a settings patch and persist.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<(), AppError> {
        if let Some(reset_time) = patch.reset_time {
            self.settings.reset_time = reset_time;
        }
        if let Some(enabled) = patch.notifications_enabled {
            self.settings.notifications_enabled = enabled;
        }
        if let Some(recipient) = patch.recipient_id {
            self.settings.recipient_id = recipient
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty());
        }
        self.save_settings()
    }

    /// Clear completion once per day after the configured reset time.
    ///
    /// Returns whether a reset happened. Every task's `updated_at` is
    /// refreshed, the celebration flag re-arms, and a greeting
    /// notification goes out best-effort.
    pub fn run_daily_reset(&mut self, now: OffsetDateTime) -> Result<bool, AppError> {
        let today = now.date();
        if today == self.settings.last_reset_date
            || now.time() < self.settings.reset_time.as_time()
        {
            return Ok(false);
        }

        for task in &mut self.tasks {
            task.completed = false;
            task.updated_at = now;
        }
        self.settings.last_reset_date = today;
        self.celebrated = false;

        self.save_tasks()?;
        self.save_settings()?;
        self.notify_best_effort("Good morning! All tasks have been reset for a new day.");
        Ok(true)
    }

    /// Signal a reminder when the reset is exactly 3 or 4 whole hours away
    /// and open tasks remain.
    ///
    /// The exact-hour rule matches the original product behavior; combined
    /// with an hourly check cadence it can miss or double-fire near the
    /// boundary, which is accepted.
    pub fn check_reminder(&self, now: OffsetDateTime) -> Option<Reminder> {
        let reset_minutes = i64::from(self.settings.reset_time.minutes_from_midnight());
        let now_minutes =
            i64::from(now.time().hour()) * 60 + i64::from(now.time().minute());
        let minutes_until_reset = (reset_minutes - now_minutes).rem_euclid(MINUTES_PER_DAY);
        let hours_until_reset = minutes_until_reset / 60;

        let incomplete = self.incomplete_count();
        if (hours_until_reset == 3 || hours_until_reset == 4) && incomplete > 0 {
            self.notify_best_effort(&format!(
                "Reminder: {incomplete} task(s) still open, about {hours_until_reset} hours until the daily reset."
            ));
            return Some(Reminder {
                incomplete,
                hours_until_reset,
            });
        }
        None
    }

    /// Returns true exactly once per full-completion cycle; the flag
    /// re-arms whenever the completed count drops below the total.
    pub fn check_celebration(&mut self) -> bool {
        let total = self.tasks.len();
        let completed = self.completed_count();

        if completed < total {
            self.celebrated = false;
            return false;
        }
        if total > 0 && !self.celebrated {
            self.celebrated = true;
            self.notify_best_effort("All tasks completed today. Great work!");
            return true;
        }
        false
    }

    /// Keep the celebration suppressed after the presentation closes it.
    pub fn dismiss_celebration(&mut self) {
        self.celebrated = true;
    }

    fn next_task_id(&self, now: OffsetDateTime) -> String {
        let mut nanos = now.unix_timestamp_nanos();
        loop {
            let id = format!("task-{nanos}");
            if !self.tasks.iter().any(|task| task.id == id) {
                return id;
            }
            nanos += 1;
        }
    }

    fn notify_best_effort(&self, message: &str) {
        if !self.settings.notifications_enabled {
            debug!("notifications disabled, skipping: {message}");
            return;
        }
        let Some(recipient) = self
            .settings
            .recipient_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
        else {
            debug!("no recipient configured, skipping notification");
            return;
        };

        if let Err(err) = self.sender.send(recipient, message) {
            warn!("notification send failed: {err}");
            if let Some(fallback) = &self.fallback
                && let Err(err) = fallback.notify("todoapp", message)
            {
                warn!("desktop fallback failed: {err}");
            }
        }
    }

    fn save_tasks(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(&self.tasks)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.storage.set(TASKS_KEY, &raw)
    }

    fn save_settings(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(&self.settings)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.storage.set(SETTINGS_KEY, &raw)
    }
}

fn load_tasks(storage: &dyn KeyValueStore) -> Result<Vec<Task>, AppError> {
    let Some(raw) = storage.get(TASKS_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(tasks) => Ok(tasks),
        Err(err) => {
            warn!("stored tasks are unreadable, starting empty: {err}");
            Ok(Vec::new())
        }
    }
}

fn load_settings(storage: &dyn KeyValueStore, today: Date) -> Result<Settings, AppError> {
    let Some(raw) = storage.get(SETTINGS_KEY)? else {
        return Ok(Settings::first_run(today));
    };
    match serde_json::from_str(&raw) {
        Ok(settings) => Ok(settings),
        Err(err) => {
            warn!("stored settings are unreadable, using defaults: {err}");
            Ok(Settings::first_run(today))
        }
    }
}
