//! CLI entrypoint for the `csdict` dictionary client.
//!
//! The binary delegates to [`csdict_cli::run`], which loads configuration,
//! checks the `-d` flag and runs the interactive prompt against stdin.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    csdict_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
