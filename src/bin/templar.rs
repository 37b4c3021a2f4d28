use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use templar::cli::args::{CliArgs, Command, OutputFormat};
use templar::cli::driver;
use templar::cli::reporter::{Reporter, render_json};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if TEMPLAR_LOG or RUST_LOG is set.
    templar::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let exit_code = match args.command {
        Command::Check(check) => {
            let run = driver::run_check(&check)?;
            match check.format {
                OutputFormat::Json => println!("{}", render_json(&run.file, &run.result)?),
                OutputFormat::Text => {
                    let color = run
                        .options
                        .pretty
                        .unwrap_or_else(|| std::io::stdout().is_terminal());
                    let reporter = Reporter::new(color);
                    if !run.result.diagnostics.is_empty() {
                        println!("{}", reporter.render(&run.result.diagnostics));
                    }
                    println!("{}", reporter.summary(&run.result));
                }
            }
            if run.result.has_errors() {
                EXIT_DIAGNOSTICS
            } else {
                EXIT_SUCCESS
            }
        }
    };

    std::process::exit(exit_code);
}
