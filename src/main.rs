use brainfry::commands::run::{self, RunArgs};
use brainfry::config::{self, ENV_LOG};
use clap::Parser;
use clap::error::ErrorKind;
use std::env;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "brainfry", version, disable_help_flag = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(flatten)]
    run: RunArgs,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn install_interrupt_handler(program: &str) {
    // Flush whatever the program printed so far, then leave with the usual SIGINT status.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        tracing::warn!("{program}: failed to set ctrl+c handler: {e}");
    }
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("brainfry"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => e.exit(),
        Err(e) => {
            let message = e.to_string();
            let first = message.lines().next().unwrap_or_default();
            eprintln!("{program}: {}", first.trim_start_matches("error: "));
            run::usage_and_exit(&program, 2);
        }
    };

    if cli.help {
        run::usage_and_exit(&program, 0);
    }

    install_interrupt_handler(&program);

    let code = run::run(&program, cli.run, config::settings());
    std::process::exit(code);
}
