use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};

use taskpill::commands::{self, AppState};
use taskpill::database;
use taskpill::models::{CreateTaskRequest, Task};
use taskpill::services::lifecycle::CompletionOutcome;
use taskpill::utils::{config, time};

#[derive(Parser)]
#[command(name = "taskpill", version, about = "Tasks that repeat themselves")]
struct Cli {
    /// Directory holding the database and config/settings.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a task; recurrence is picked up from the title or --repeat
    Add {
        title: String,
        #[arg(long)]
        repeat: Option<String>,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List tasks
    List {
        #[arg(long)]
        status: Option<String>,
    },
    /// Complete a task, creating the next one if it repeats
    Complete { id: String },
    /// Show the pattern found in some text
    Parse { text: String },
    /// Show upcoming dates for the pattern found in some text
    Preview {
        text: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() -> Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    let settings = config::load_settings(&data_dir)?;
    let db_path = config::database_path(&data_dir, &settings);

    database::init_database(&db_path)
        .with_context(|| format!("initializing database at {}", db_path.display()))?;
    log::debug!("Using database {}", db_path.display());

    let state = AppState { db_path, settings };

    match cli.command {
        Command::Add { title, repeat, due } => {
            let recurring_pattern = match repeat.as_deref() {
                Some(text) => Some(
                    taskpill::parse(text).ok_or_else(|| anyhow!("no recurrence found in '{}'", text))?,
                ),
                None => None,
            };
            let request = CreateTaskRequest {
                original_input: Some(title.clone()),
                title,
                notes: None,
                project: None,
                priority: None,
                due_date: due.map(start_of_day),
                recurring_pattern,
            };
            let task = commands::task::create_task(&state, request).map_err(|e| anyhow!(e))?;
            print_task(&task);
        }
        Command::List { status } => {
            for task in commands::task::get_tasks(&state, status, None).map_err(|e| anyhow!(e))? {
                print_task(&task);
            }
        }
        Command::Complete { id } => {
            match commands::task::complete_task(&state, id).map_err(|e| anyhow!(e))? {
                CompletionOutcome::NotRecurring => println!("Completed."),
                CompletionOutcome::Ended { final_pattern } => {
                    println!("Completed. Series finished ({}).", final_pattern.display_string())
                }
                CompletionOutcome::Spawned { successor } => {
                    println!("Completed. Next one:");
                    print_task(&successor);
                }
            }
        }
        Command::Parse { text } => match commands::recurrence::parse_recurrence(text).map_err(|e| anyhow!(e))? {
            Some(pattern) => {
                println!("{}", pattern.display_string());
                println!("{}", pattern.to_json()?);
            }
            None => println!("No recurrence found."),
        },
        Command::Preview { text, from, count } => {
            let pattern = taskpill::parse(&text).ok_or_else(|| anyhow!("no recurrence found in '{}'", text))?;
            let count = count.unwrap_or(state.settings.recurrence.preview_count);
            let preview = commands::recurrence::preview_occurrences(pattern, from.map(start_of_day), count)
                .map_err(|e| anyhow!(e))?;
            println!("{}", preview.display);
            for ts in preview.upcoming {
                if let Some(date) = time::local_from_timestamp(ts) {
                    println!("  {}", date.format("%a %Y-%m-%d"));
                }
            }
        }
    }

    Ok(())
}

fn start_of_day(date: NaiveDate) -> i64 {
    time::timestamp_from_local(date.and_time(NaiveTime::MIN))
}

fn print_task(task: &Task) {
    let due = task
        .due_date
        .and_then(time::local_from_timestamp)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let repeat = task
        .recurring_pattern
        .as_ref()
        .map(|p| format!(" [{}]", p.display_string()))
        .unwrap_or_default();

    println!("{}  {:<10} {} {}{}", task.id, task.status.as_str(), due, task.title, repeat);
}
