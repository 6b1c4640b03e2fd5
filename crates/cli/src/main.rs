use std::process::ExitCode;

use clap::Parser;

use sysbatch_cli::app::{self, Cli, EXIT_REJECTED};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match app::run(cli, &mut stdout) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("sysbatch: {err:#}");
            ExitCode::from(EXIT_REJECTED)
        }
    }
}
