use std::process::ExitCode;

fn main() -> ExitCode {
    studybot_cli::run()
}
