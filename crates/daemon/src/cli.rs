//! Command-line arguments

use std::path::PathBuf;

use anyhow::{anyhow, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Run the cron scheduler until interrupted
    #[default]
    Run,
    /// Run a single tick and print its report
    Tick,
    /// Validate configuration and storage, then print the effective config
    Check,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cli {
    pub command: Command,
    pub config_path: Option<PathBuf>,
}

impl Cli {
    /// Parse arguments, excluding the program name.
    ///
    /// # Errors
    /// Unknown commands or flags, a second command, or `--config` without a
    /// value.
    pub fn parse_from<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Self::default();
        let mut command = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let value = args.next().ok_or_else(|| anyhow!("{arg} requires a path"))?;
                    cli.config_path = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--config=") => {
                    cli.config_path = Some(PathBuf::from(&flag["--config=".len()..]));
                }
                "--help" | "-h" | "help" => command = Some(Command::Help),
                "run" | "tick" | "check" => {
                    if command.is_some() {
                        bail!("only one command may be given, got extra '{arg}'");
                    }
                    command = Some(match arg.as_str() {
                        "tick" => Command::Tick,
                        "check" => Command::Check,
                        _ => Command::Run,
                    });
                }
                other => bail!("unknown argument: {other}"),
            }
        }

        cli.command = command.unwrap_or_default();
        Ok(cli)
    }
}

pub const USAGE: &str = "\
duebell - due-date reminder service

USAGE:
    duebell [COMMAND] [--config <PATH>]

COMMANDS:
    run      Start the reminder scheduler (default)
    tick     Run one reminder tick and print the report as JSON
    check    Validate config and database, print the effective config
    help     Show this help message

OPTIONS:
    -c, --config <PATH>  TOML or JSON config file; otherwise DUEBELL_* env
                         vars or duebell.toml next to the binary are used

ENVIRONMENT:
    RUST_LOG             Log filter (default: info)
    DUEBELL_LOG_FORMAT   'json' for structured output, otherwise human-readable
";
