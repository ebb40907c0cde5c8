use clap::Parser;
use tabled::{Table, Tabled};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use todo_cli::cli::{Cli, Command, SettingsCommand};
use todo_core::error::AppError;
use todo_core::model::{SettingsPatch, Task};
use todo_core::notify::{NoopSender, NotificationSender, RelaySender, desktop_notifier};
use todo_core::scheduler::{Scheduler, TickOutcome};
use todo_core::storage::FileStore;
use todo_core::store::TaskStore;
use tracing_subscriber::EnvFilter;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "status")]
    status: &'static str,
    #[tabled(rename = "text")]
    text: String,
    #[tabled(rename = "updated")]
    updated: String,
}

fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

fn open_store() -> Result<TaskStore, AppError> {
    let storage = FileStore::from_env()?;
    let sender: Box<dyn NotificationSender> = match RelaySender::from_env() {
        Some(sender) => Box::new(sender),
        None => Box::new(NoopSender),
    };
    let store = TaskStore::open(Box::new(storage), sender, local_now().date())?
        .with_desktop_fallback(desktop_notifier());
    Ok(store)
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.to_string())
}

fn print_task(task: &Task, action: &str) {
    println!("{action} task: {} ({})", task.text, task.id);
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    let json =
        serde_json::to_string(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn print_tasks_plain(store: &TaskStore) {
    if store.tasks().is_empty() {
        println!("No tasks yet.");
        return;
    }

    let rows: Vec<TaskRow> = store
        .tasks()
        .iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            status: if task.completed { "done" } else { "open" },
            text: task.text.clone(),
            updated: format_timestamp(task.updated_at),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!(
        "{} of {} completed",
        store.completed_count(),
        store.tasks().len()
    );
}

fn print_tasks_json(store: &TaskStore) -> Result<(), AppError> {
    let json = serde_json::to_string(store.tasks())
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn print_settings(store: &TaskStore, json: bool) -> Result<(), AppError> {
    if json {
        let raw = serde_json::to_string(store.settings())
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        println!("{raw}");
        return Ok(());
    }

    let settings = store.settings();
    println!("reset time:     {}", settings.reset_time);
    println!("last reset:     {}", settings.last_reset_date);
    println!(
        "notifications:  {}",
        if settings.notifications_enabled {
            "on"
        } else {
            "off"
        }
    );
    println!(
        "recipient id:   {}",
        settings.recipient_id.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn print_outcome(outcome: &TickOutcome) {
    if outcome.reset {
        println!("Daily reset performed.");
    }
    if let Some(reminder) = &outcome.reminder {
        println!(
            "Reminder: {} task(s) still open, about {} hours until the daily reset.",
            reminder.incomplete, reminder.hours_until_reset
        );
    }
    if outcome.celebration {
        println!("All tasks completed today. Great work!");
    }
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|_| AppError::invalid_input("--at must be an RFC 3339 timestamp"))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Add { text } => {
            let mut store = open_store()?;
            match store.add_task(&text, local_now())? {
                Some(task) => {
                    if cli.json {
                        print_task_json(&task)?;
                    } else {
                        print_task(&task, "Added");
                    }
                }
                None => eprintln!("Ignored empty task text."),
            }
        }
        Command::List => {
            let store = open_store()?;
            if cli.json {
                print_tasks_json(&store)?;
            } else {
                print_tasks_plain(&store);
            }
        }
        Command::Toggle { id } => {
            let mut store = open_store()?;
            match store.toggle_task(&id, local_now())? {
                Some(task) => {
                    if cli.json {
                        print_task_json(&task)?;
                    } else {
                        let state = if task.completed { "done" } else { "open" };
                        println!("Marked task {state}: {} ({})", task.text, task.id);
                    }
                }
                None => println!("No task with id {id}."),
            }
        }
        Command::Edit { id, new_text } => {
            let mut store = open_store()?;
            match store.update_task(&id, &new_text, local_now())? {
                Some(task) => {
                    if cli.json {
                        print_task_json(&task)?;
                    } else {
                        print_task(&task, "Updated");
                    }
                }
                None => println!("Nothing updated."),
            }
        }
        Command::Delete { id } => {
            let mut store = open_store()?;
            match store.delete_task(&id)? {
                Some(task) => {
                    if cli.json {
                        print_task_json(&task)?;
                    } else {
                        print_task(&task, "Deleted");
                    }
                }
                None => println!("No task with id {id}."),
            }
        }
        Command::Settings { settings } => match settings {
            SettingsCommand::Show => {
                let store = open_store()?;
                print_settings(&store, cli.json)?;
            }
            SettingsCommand::Set {
                reset_time,
                notifications,
                recipient_id,
                clear_recipient,
            } => {
                let mut store = open_store()?;
                let reset_time = reset_time.as_deref().map(str::parse).transpose()?;
                let recipient_id = if clear_recipient {
                    Some(None)
                } else {
                    recipient_id.map(Some)
                };
                store.update_settings(SettingsPatch {
                    reset_time,
                    notifications_enabled: notifications.map(|value| value.as_bool()),
                    recipient_id,
                })?;
                print_settings(&store, cli.json)?;
            }
        },
        Command::Tick { at } => {
            let now = match at {
                Some(raw) => parse_instant(&raw)?,
                None => local_now(),
            };
            let mut store = open_store()?;
            let mut scheduler = Scheduler::new();
            let outcome = scheduler.tick(&mut store, now)?;
            print_outcome(&outcome);
        }
        Command::Watch { interval_secs } => {
            let mut store = open_store()?;
            let mut scheduler = Scheduler::new();
            let interval = std::time::Duration::from_secs(interval_secs.max(1));
            loop {
                let outcome = scheduler.tick(&mut store, local_now())?;
                print_outcome(&outcome);
                std::thread::sleep(interval);
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.use_stderr() {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(2);
            }
            // --help / --version render through clap directly.
            let _ = err.print();
            return;
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
