use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use todostore::{Config, Filter, Priority, Status, Summary, Task, TaskStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, reload};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - Personal task tracker backed by a JSON file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the task file (overrides the config file)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to the config file (default: <config dir>/todostore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task text
        #[arg(required = true)]
        text: Vec<String>,

        /// low, medium or high (default: medium)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// List tasks, most urgent first
    List {
        /// Only tasks with this status (pending, in_progress, done)
        #[arg(short, long)]
        status: Option<Status>,

        /// Only tasks with this priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Case-insensitive text search
        #[arg(long)]
        search: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the full text of a task
    Show { id: u64 },

    /// Set the status of tasks (pending, in_progress, done)
    Status {
        status: String,
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Advance tasks one step: pending -> in_progress -> done -> pending
    Cycle {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Mark tasks as in progress
    Start {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Mark tasks as done
    Done {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Mark tasks as pending again
    Reopen {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Delete tasks
    Remove {
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show completion statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing before the config is read; its log level is applied once known
    let explicit_level = cli.verbose || std::env::var_os("RUST_LOG").is_some();
    let initial = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    if !explicit_level {
        filter_handle.reload(EnvFilter::new(&config.log_level))?;
    }

    if cli.no_color || !config.color {
        colored::control::set_override(false);
    }

    let data_file = cli.file.clone().unwrap_or_else(|| config.data_file.clone());
    let mut store = TaskStore::open_with(&data_file, config.write_mode())?;

    if let Some(warning) = store.load_warning() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
        eprintln!("Starting with an empty task list; the file will be replaced on the next change.");
    }

    match cli.command {
        Commands::Add { text, priority } => {
            let id = store.add(&text.join(" "), priority)?;
            println!("Added task {}", id.to_string().bold());
        }
        Commands::List {
            status,
            priority,
            search,
            json,
        } => {
            let filter = Filter::new()
                .status(status)
                .priority(priority)
                .search(search.unwrap_or_default());
            let view = todostore::sort(todostore::filter(store.tasks(), &filter));

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else if view.is_empty() {
                println!("No tasks");
            } else {
                for task in view {
                    print_task_line(task);
                }
            }
        }
        Commands::Show { id } => match store.get(id) {
            Some(task) => {
                print_task_line(task);
                println!();
                println!("{}", task.text().trim());
            }
            None => println!("No task with id {}", id),
        },
        Commands::Status { status, ids } => {
            let count = store.set_status_named(&ids, &status)?;
            println!("Updated {} task(s)", count);
        }
        Commands::Cycle { ids } => {
            let count = store.cycle_status(&ids)?;
            println!("Updated {} task(s)", count);
        }
        Commands::Start { ids } => {
            let count = store.set_status(&ids, Status::InProgress)?;
            println!("Updated {} task(s)", count);
        }
        Commands::Done { ids } => {
            let count = store.set_status(&ids, Status::Done)?;
            println!("Updated {} task(s)", count);
        }
        Commands::Reopen { ids } => {
            let count = store.set_status(&ids, Status::Pending)?;
            println!("Updated {} task(s)", count);
        }
        Commands::Remove { ids, yes } => {
            let targets: Vec<&Task> = ids.iter().filter_map(|id| store.get(*id)).collect();
            if targets.is_empty() {
                println!("No matching tasks");
                return Ok(());
            }

            if !yes {
                for task in &targets {
                    print_task_line(task);
                }
                if !confirm(&format!("Remove {} task(s)?", targets.len()))? {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            let count = store.remove(&ids)?;
            println!("Removed {} task(s)", count);
        }
        Commands::Stats { json } => {
            let summary = todostore::summarize(store.tasks());
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}

fn status_label(status: Status) -> ColoredString {
    let label = format!("{:<11}", status.as_str());
    match status {
        Status::Pending => label.yellow(),
        Status::InProgress => label.blue(),
        Status::Done => label.green(),
    }
}

fn priority_label(priority: Priority) -> ColoredString {
    let label = format!("{:<6}", priority.as_str());
    match priority {
        Priority::High => label.red().bold(),
        Priority::Medium => label.normal(),
        Priority::Low => label.dimmed(),
    }
}

fn print_task_line(task: &Task) {
    let text = match task.status() {
        Status::Done => task.display_text().dimmed(),
        _ => task.display_text().normal(),
    };
    println!(
        "{:>4}  {}  {}  {}",
        task.id(),
        status_label(task.status()),
        priority_label(task.priority()),
        text
    );
}

fn print_summary(summary: &Summary) {
    const BAR_WIDTH: usize = 20;
    let filled = (summary.completion_ratio() * BAR_WIDTH as f64) as usize;

    println!("Total:       {}", summary.total);
    println!("Pending:     {}", summary.pending.to_string().yellow());
    println!("In progress: {}", summary.in_progress.to_string().blue());
    println!("Done:        {}", summary.done.to_string().green());
    println!(
        "[{}{}] {}%",
        "#".repeat(filled).green(),
        "-".repeat(BAR_WIDTH - filled),
        summary.completion_percent
    );
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
