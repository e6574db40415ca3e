pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::report::ReportArgs;
use crate::commands::task::TaskArgs;
use crate::commands::CommandContext;

#[derive(Debug, Parser)]
#[command(
    name = "retail-agency",
    about = "Retail agency operator CLI",
    long_about = "Run the retail agency's tools directly: generate reports, look up dates, \
                  post to Slack and Notion, record tasks, and inspect configuration.",
    after_help = "Examples:\n  retail-agency report --title \"Q1\" --format text --metrics q1.json\n  \
                  retail-agency date --timezone America/New_York --format datetime\n  \
                  retail-agency tools\n  retail-agency config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to retail-agency.toml (default: ./retail-agency.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Generate a report from a JSON metrics mapping (file or stdin)")]
    Report(ReportArgs),
    #[command(about = "Current date and time in a timezone")]
    Date {
        #[arg(long, help = "IANA timezone (default: agency.default_timezone)")]
        timezone: Option<String>,
        #[arg(long, default_value = "full", help = "full | date | time | datetime")]
        format: String,
    },
    #[command(about = "Post a message to a Slack channel")]
    Slack {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        message: String,
        #[arg(long, help = "Reply in the thread of this message timestamp")]
        thread_ts: Option<String>,
    },
    #[command(about = "Create a Notion page holding the given text")]
    Notion {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    #[command(about = "Create a task record")]
    Task(TaskArgs),
    #[command(about = "List agents, their tools and delegation flows")]
    Tools,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let context = CommandContext::new(cli.config);

    let result = match cli.command {
        Command::Report(args) => commands::report::run(&context, args).await,
        Command::Date { timezone, format } => {
            commands::date::run(&context, timezone, format).await
        }
        Command::Slack { channel, message, thread_ts } => {
            commands::slack::run(&context, channel, message, thread_ts).await
        }
        Command::Notion { title, content, tags } => {
            commands::notion::run(&context, title, content, tags).await
        }
        Command::Task(args) => commands::task::run(&context, args).await,
        Command::Tools => commands::tools::run(&context),
        Command::Config => commands::config::run(&context),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
