//! Operator command parsing.
//!
//! Each input line is parsed with clap, so the interactive commands get the
//! same validation and help output as the command-line flags.

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::analyzer::FrameAnalyzer;
use crate::capture::{CancelToken, LinkHandle};
use crate::error::ShellError;
use crate::reporter::SessionReporter;
use crate::session::ReplaySession;

#[derive(Parser, Debug)]
#[command(name = "netreplay", no_binary_name = true, disable_help_flag = true)]
#[command(disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Commands accepted at the operator prompt.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Capture frames for a number of seconds (Ctrl+C stops early)
    Capture {
        /// Capture duration in seconds (defaults to the configured value)
        seconds: Option<u64>,
    },
    /// List captured frames
    #[command(alias = "ls")]
    List,
    /// Show the dissection of one captured frame
    Show {
        /// Frame id as shown by `list`
        id: u64,
    },
    /// Select frames by exact source and destination address
    Filter {
        source: String,
        destination: String,
    },
    /// List frames selected for replay
    Filtered,
    /// Replay the filtered frames with pacing
    Replay,
    /// Run one retry pass over the backup queue
    Retry,
    /// Show queue sizes and the bound interface
    Stats,
    /// Run the whole pipeline once: capture for the configured duration,
    /// list, stats, filter by the given pair, list filtered, replay, stats
    Demo {
        source: String,
        destination: String,
    },
    /// Show available commands
    Help,
    /// Shut down and exit
    #[command(alias = "exit")]
    Quit,
}

impl ShellCommand {
    /// Parse one line of operator input.
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Err(ShellError::Empty);
        }

        ShellLine::try_parse_from(words)
            .map(|parsed| parsed.command)
            .map_err(|e| ShellError::Invalid(e.to_string().trim_end().to_string()))
    }

    /// Help text listing every command.
    pub fn help() -> String {
        use clap::CommandFactory;

        ShellLine::command()
            .override_usage("<command> [args]")
            .render_help()
            .to_string()
    }
}

/// Whether the prompt loop should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one operator command against the session.
///
/// `default_capture` is used when `capture` has no explicit duration and by
/// `demo`. The cancel token is reset before every capture so an earlier
/// Ctrl+C does not cut the next one short.
pub fn execute<H, A, R>(
    session: &mut ReplaySession<H, A>,
    command: ShellCommand,
    default_capture: Duration,
    cancel: &CancelToken,
    reporter: &R,
) -> Flow
where
    H: LinkHandle,
    A: FrameAnalyzer,
    R: SessionReporter,
{
    match command {
        ShellCommand::Capture { seconds } => {
            let duration = match seconds {
                Some(0) | None => default_capture,
                Some(secs) => Duration::from_secs(secs),
            };
            cancel.reset();
            reporter.capture(&session.capture(duration, cancel));
        }
        ShellCommand::List => reporter.captured_listing(&session.list_captured()),
        ShellCommand::Show { id } => match session.show_details(id) {
            Ok(details) => reporter.details(&details),
            Err(e) => reporter.problem(&e.to_string()),
        },
        ShellCommand::Filter {
            source,
            destination,
        } => reporter.filter(&session.filter(&source, &destination)),
        ShellCommand::Filtered => reporter.filtered_listing(&session.list_filtered()),
        ShellCommand::Replay => reporter.replay(&session.replay()),
        ShellCommand::Retry => reporter.retry(&session.retry_backup()),
        ShellCommand::Stats => reporter.stats(&session.stats()),
        ShellCommand::Demo {
            source,
            destination,
        } => {
            cancel.reset();
            reporter.capture(&session.capture(default_capture, cancel));
            reporter.captured_listing(&session.list_captured());
            reporter.stats(&session.stats());
            reporter.filter(&session.filter(&source, &destination));
            reporter.filtered_listing(&session.list_filtered());
            reporter.replay(&session.replay());
            reporter.stats(&session.stats());
        }
        ShellCommand::Help => reporter.details(&ShellCommand::help()),
        ShellCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}
