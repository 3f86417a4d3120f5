//! netreplay - interactive link-layer capture and replay.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use netreplay::error::ShellError;
use netreplay::reporter::{ConsoleReporter, SessionReporter};
use netreplay::shell::{self, Flow, ShellCommand};
use netreplay::{CancelToken, Config, LinkHandle, PnetAnalyzer, PnetHandle, ReplaySession};

/// Conventional exit status for a process ended by SIGINT.
const INTERRUPT_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(name = "netreplay")]
#[command(about = "Capture link-layer frames and replay a filtered subset")]
struct Args {
    /// Network interface to bind (e.g., eth0)
    #[arg(short, long)]
    interface: Option<String>,

    /// Config file (default: /etc/netreplay.conf)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List available interfaces and exit
    #[arg(long)]
    list_interfaces: bool,

    /// Debug logging and per-frame summaries in listings
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(config: &Config, verbose: bool) {
    let directive = if verbose { "debug" } else { config.log.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config, args.verbose);
    for key in &config.ignored_keys {
        tracing::warn!("Ignoring unknown config key '{}'", key);
    }

    if args.list_interfaces {
        for line in PnetHandle::list_interfaces() {
            println!("{}", line);
        }
        return Ok(());
    }

    let link = match args.interface.as_deref().or(config.interface.as_deref()) {
        Some(name) => PnetHandle::open(name, config.poll_interval()),
        None => PnetHandle::open_default(config.poll_interval()),
    }
    .context("Failed to open capture interface")?;

    // Ctrl+C stops a running capture; anywhere else it ends the process
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if !handler_token.interrupt() {
            tracing::info!("Interrupted, exiting");
            std::process::exit(INTERRUPT_EXIT_CODE);
        }
    })
    .context("Failed to install Ctrl+C handler")?;

    let reporter = ConsoleReporter::new().with_verbose(args.verbose);
    let mut session = ReplaySession::new(link, PnetAnalyzer::new(), config.session_config());
    reporter.on_start(session.link().interface_name());

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("netreplay> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match ShellCommand::parse(&line) {
            Ok(command) => {
                let flow = shell::execute(
                    &mut session,
                    command,
                    config.capture_duration(),
                    &cancel,
                    &reporter,
                );
                if flow == Flow::Quit {
                    break;
                }
            }
            Err(ShellError::Empty) => {}
            Err(e) => reporter.problem(&e.to_string()),
        }
    }

    let stats = session.shutdown();
    reporter.on_stop(&stats);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    run(args).context("netreplay failed")
}
