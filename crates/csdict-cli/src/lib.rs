//! Interactive client runtime for DICT dictionary servers.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! and the prompt loop that drives a [`session::Session`]. Input and output
//! streams as well as the configuration loader are injected so the runtime
//! can be exercised from tests without a terminal.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

mod cli;
mod command;
mod config;
mod errors;
mod repl;
mod session;
mod telemetry;
mod transport;

#[cfg(test)]
mod tests;

use cli::Cli;
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use errors::AppError;
use session::Session;
use transport::{TcpConnector, Timeouts};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `csdict_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--connect-timeout-secs",
    "--read-timeout-secs",
    "--prompt",
    "--log-filter",
    "--log-format",
];

/// Client options accepted after the configuration flags.
const MAX_CLIENT_OPTIONS: usize = 1;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, R: BufRead, W: Write, E: Write> {
    pub(crate) stdin: &'a mut R,
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, R: BufRead, W: Write, E: Write> IoStreams<'a, R, W, E> {
    pub(crate) fn new(stdin: &'a mut R, stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }
}

struct CliRunner<'a, 'io, R: BufRead, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, R, W, E>,
    loader: &'a L,
}

impl<'a, 'io, R, W, E, L> CliRunner<'a, 'io, R, W, E, L>
where
    R: BufRead,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'io, R, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let result = parse_client_options(&args, &split)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| {
                telemetry::initialise(&config)?;
                debug!(debug = cli.debug, "configuration loaded");
                if cli.debug {
                    writeln!(self.io.stdout, "Debugging output enabled")
                        .map_err(AppError::WriteOutput)?;
                }
                let mut session =
                    Session::new(TcpConnector, Timeouts::from(&config), cli.debug);
                repl::run_repl(&mut session, config.prompt(), self.io)
            });

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(AppError::CliDisplay(display)) => {
                let _ = write!(self.io.stdout, "{display}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the client using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdin, stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

fn parse_client_options(args: &[OsString], split: &ConfigArgumentSplit) -> Result<Cli, AppError> {
    let cli_arguments = prepare_cli_arguments(args, split);
    if cli_arguments.len().saturating_sub(1) > MAX_CLIENT_OPTIONS {
        return Err(AppError::TooManyOptions);
    }
    Cli::try_parse_from(cli_arguments).map_err(|error| match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => AppError::CliDisplay(error),
        _ => AppError::InvalidOption(error),
    })
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if split.command_start < args.len() {
        cli_arguments.extend(args[split.command_start..].iter().cloned());
    }
    cli_arguments
}
