use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: todo add "Buy milk"
    Add {
        text: String,
    },
    /// List tasks
    List,
    /// Toggle a task's completion status
    ///
    /// Example: todo toggle task-1700000000000000000
    Toggle {
        id: String,
    },
    /// Edit a task's text
    ///
    /// Example: todo edit task-1700000000000000000 "Buy organic milk"
    Edit {
        id: String,
        new_text: String,
    },
    /// Delete a task
    Delete {
        id: String,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        settings: SettingsCommand,
    },
    /// Run one scheduler pass (reset, reminder, celebration checks)
    ///
    /// Example: todo tick --at 2024-01-02T07:00:00Z
    Tick {
        /// Evaluate against this RFC 3339 instant instead of the wall clock
        #[arg(long)]
        at: Option<String>,
    },
    /// Keep running scheduler passes against the wall clock
    ///
    /// Example: todo watch --interval-secs 30
    Watch {
        /// Seconds between passes
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print current settings
    Show,
    /// Update settings fields
    ///
    /// Example: todo settings set --reset-time 06:30 --notifications on
    Set {
        /// Daily reset time (HH:MM, 24h)
        #[arg(long)]
        reset_time: Option<String>,
        /// Enable or disable messenger notifications
        #[arg(long)]
        notifications: Option<OnOff>,
        /// Messenger recipient id used for notifications
        #[arg(long)]
        recipient_id: Option<String>,
        /// Clear the stored recipient id
        #[arg(long)]
        clear_recipient: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn as_bool(self) -> bool {
        matches!(self, Self::On)
    }
}
