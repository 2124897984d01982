pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "studybot",
    about = "Student build assistant operator CLI",
    long_about = "Talk to the build assistant, check Jenkins readiness, and inspect configuration.",
    after_help = "Examples:\n  studybot chat \"list builds\"\n  studybot chat \"build 3\" --student-id s-17\n  studybot doctor --json\n  studybot config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Send one chat message through the assistant and print the JSON response")]
    Chat {
        #[arg(help = "Message text, e.g. \"list builds\" or \"build 3\"")]
        message: String,
        #[arg(long, help = "Student id attached to triggered builds")]
        student_id: Option<String>,
    },
    #[command(about = "Validate config and Jenkins reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { message, student_id } => commands::chat::run(&message, student_id),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
