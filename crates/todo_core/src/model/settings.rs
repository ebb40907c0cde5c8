use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, Time};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Time of day (24h) at which completed tasks are cleared.
///
/// Serialized as the string `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTime {
    hour: u8,
    minute: u8,
}

impl ResetTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, AppError> {
        if hour > 23 || minute > 59 {
            return Err(AppError::invalid_input(format!(
                "reset time {hour:02}:{minute:02} is out of range"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_from_midnight(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn as_time(&self) -> Time {
        Time::from_hms(self.hour, self.minute, 0).unwrap_or(Time::MIDNIGHT)
    }
}

impl Default for ResetTime {
    fn default() -> Self {
        Self { hour: 6, minute: 0 }
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ResetTime {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| AppError::invalid_input("reset time must be HH:MM"))?;
        let hour: u8 = hour
            .parse()
            .map_err(|_| AppError::invalid_input("reset time must be HH:MM"))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| AppError::invalid_input("reset time must be HH:MM"))?;
        Self::new(hour, minute)
    }
}

impl Serialize for ResetTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResetTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-user preferences, persisted under the `settings` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub reset_time: ResetTime,
    #[serde(default = "default_reset_date", with = "iso_date")]
    pub last_reset_date: Date,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

fn default_reset_date() -> Date {
    Date::MIN
}

impl Settings {
    /// Settings for a session with no stored state. `last_reset_date`
    /// starts at the current date so a fresh install does not immediately
    /// run the daily reset.
    pub fn first_run(today: Date) -> Self {
        Self {
            reset_time: ResetTime::default(),
            last_reset_date: today,
            notifications_enabled: false,
            recipient_id: None,
        }
    }
}

/// Partial update applied by `TaskStore::update_settings`.
///
/// `recipient_id` is doubly optional: `None` leaves the stored value
/// alone, `Some(None)` clears it.
#[derive(Debug, Default, Clone)]
pub struct SettingsPatch {
    pub reset_time: Option<ResetTime>,
    pub notifications_enabled: Option<bool>,
    pub recipient_id: Option<Option<String>>,
}
