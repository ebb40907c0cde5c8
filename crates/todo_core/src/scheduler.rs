use crate::error::AppError;
use crate::store::{Reminder, TaskStore};
use time::OffsetDateTime;

/// How often the daily-reset rule is evaluated. Keeps the gap between the
/// reset threshold and the actual reset under a minute.
pub const RESET_CHECK_SECS: i64 = 60;
/// How often reminder eligibility is evaluated. Deliberately coarse; the
/// exact-hour reminder rule tolerates misses near the boundary.
pub const REMINDER_CHECK_SECS: i64 = 3600;

/// Recurring check with a minimum spacing between runs.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_secs: i64,
    last_run: Option<OffsetDateTime>,
}

impl Cadence {
    pub fn new(interval_secs: i64) -> Self {
        Self {
            interval_secs,
            last_run: None,
        }
    }

    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        match self.last_run {
            None => true,
            Some(last) => (now - last).whole_seconds() >= self.interval_secs,
        }
    }

    pub fn mark_run(&mut self, now: OffsetDateTime) {
        self.last_run = Some(now);
    }
}

/// What a single scheduler pass did.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickOutcome {
    pub reset: bool,
    pub reminder: Option<Reminder>,
    pub celebration: bool,
}

/// Drives the store's evaluators. Production calls [`Scheduler::tick`]
/// from a timer loop with the current local time; tests call it with
/// fabricated instants.
pub struct Scheduler {
    reset: Cadence,
    reminder: Cadence,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            reset: Cadence::new(RESET_CHECK_SECS),
            reminder: Cadence::new(REMINDER_CHECK_SECS),
        }
    }

    pub fn tick(
        &mut self,
        store: &mut TaskStore,
        now: OffsetDateTime,
    ) -> Result<TickOutcome, AppError> {
        let mut outcome = TickOutcome::default();

        if self.reset.is_due(now) {
            self.reset.mark_run(now);
            outcome.reset = store.run_daily_reset(now)?;
        }
        if self.reminder.is_due(now) {
            self.reminder.mark_run(now);
            outcome.reminder = store.check_reminder(now);
        }
        outcome.celebration = store.check_celebration();

        Ok(outcome)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cadence, Scheduler};
    use crate::model::SettingsPatch;
    use crate::notify::NoopSender;
    use crate::storage::MemoryStore;
    use crate::store::TaskStore;
    use time::Duration;
    use time::macros::{date, datetime};

    fn make_store() -> TaskStore {
        TaskStore::open(
            Box::new(MemoryStore::new()),
            Box::new(NoopSender),
            date!(2024 - 01 - 01),
        )
        .unwrap()
    }

    #[test]
    fn cadence_is_due_when_never_run() {
        let cadence = Cadence::new(60);
        assert!(cadence.is_due(datetime!(2024-01-01 10:00 UTC)));
    }

    #[test]
    fn cadence_waits_out_the_interval() {
        let now = datetime!(2024-01-01 10:00 UTC);
        let mut cadence = Cadence::new(60);
        cadence.mark_run(now);

        assert!(!cadence.is_due(now + Duration::seconds(30)));
        assert!(cadence.is_due(now + Duration::seconds(60)));
        assert!(cadence.is_due(now + Duration::seconds(3600)));
    }

    #[test]
    fn first_tick_runs_both_evaluators() {
        let mut store = make_store();
        let t0 = datetime!(2024-01-01 10:00 UTC);
        store.add_task("open", t0).unwrap();

        // 02:00 the next day is four hours before the 06:00 reset, and the
        // stored last-reset date is already stale, so both rules fire.
        let mut scheduler = Scheduler::new();
        let outcome = scheduler
            .tick(&mut store, datetime!(2024-01-02 02:00 UTC))
            .unwrap();

        assert!(!outcome.reset, "02:00 is before the reset time");
        let reminder = outcome.reminder.unwrap();
        assert_eq!(reminder.incomplete, 1);
        assert_eq!(reminder.hours_until_reset, 4);
    }

    #[test]
    fn reminder_cadence_is_hourly() {
        let mut store = make_store();
        let t0 = datetime!(2024-01-01 10:00 UTC);
        store.add_task("open", t0).unwrap();

        let mut scheduler = Scheduler::new();
        let first = datetime!(2024-01-02 02:00 UTC);
        assert!(scheduler.tick(&mut store, first).unwrap().reminder.is_some());

        // Two minutes later the reminder check is skipped even though the
        // rule would still match.
        let soon = first + Duration::minutes(2);
        assert!(scheduler.tick(&mut store, soon).unwrap().reminder.is_none());

        // An hour later it runs again (now three hours out).
        let later = first + Duration::hours(1);
        let outcome = scheduler.tick(&mut store, later).unwrap();
        assert_eq!(outcome.reminder.unwrap().hours_until_reset, 3);
    }

    #[test]
    fn tick_performs_the_daily_reset() {
        let mut store = make_store();
        let t0 = datetime!(2024-01-01 10:00 UTC);
        let task = store.add_task("open", t0).unwrap().unwrap();
        store.toggle_task(&task.id, t0 + Duration::minutes(1)).unwrap();

        let mut scheduler = Scheduler::new();
        let outcome = scheduler
            .tick(&mut store, datetime!(2024-01-02 06:05 UTC))
            .unwrap();

        assert!(outcome.reset);
        assert_eq!(store.completed_count(), 0);
        assert_eq!(store.settings().last_reset_date, date!(2024 - 01 - 02));
    }

    #[test]
    fn tick_reports_celebration_once() {
        let mut store = make_store();
        let t0 = datetime!(2024-01-01 10:00 UTC);
        let task = store.add_task("only", t0).unwrap().unwrap();
        store.toggle_task(&task.id, t0 + Duration::minutes(1)).unwrap();
        store
            .update_settings(SettingsPatch {
                // Push the reset time away so the tick below cannot reset.
                reset_time: Some("23:59".parse().unwrap()),
                ..SettingsPatch::default()
            })
            .unwrap();

        let mut scheduler = Scheduler::new();
        let first = scheduler
            .tick(&mut store, datetime!(2024-01-01 11:00 UTC))
            .unwrap();
        assert!(first.celebration);

        let second = scheduler
            .tick(&mut store, datetime!(2024-01-01 11:05 UTC))
            .unwrap();
        assert!(!second.celebration);
    }
}
