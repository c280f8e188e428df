//! The interactive prompt loop.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::IoStreams;
use crate::command::Invocation;
use crate::errors::AppError;
use crate::session::{Flow, Session};
use crate::transport::Connector;

/// Reads commands until `quit`, end of input, or an input error.
///
/// Command failures are reported on stderr and the loop carries on. End of
/// input behaves like `quit`. Bytes that are not UTF-8 are replaced, so only
/// a failing read shuts the session down with [`AppError::ReadInput`].
pub(crate) fn run_repl<C, R, W, E>(
    session: &mut Session<C>,
    prompt: &str,
    io: &mut IoStreams<'_, R, W, E>,
) -> Result<(), AppError>
where
    C: Connector,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut buffer = Vec::new();
    loop {
        write!(io.stdout, "{prompt}").map_err(AppError::WriteOutput)?;
        io.stdout.flush().map_err(AppError::WriteOutput)?;

        buffer.clear();
        match io.stdin.read_until(b'\n', &mut buffer) {
            Ok(0) => {
                info!("end of input");
                session.shutdown(&mut *io.stdout);
                return Ok(());
            }
            Ok(_) => {}
            Err(error) => {
                session.shutdown(&mut *io.stdout);
                return Err(AppError::ReadInput(error));
            }
        }

        // Terminals in legacy encodings still get their command run.
        let line = String::from_utf8_lossy(&buffer);
        let outcome = Invocation::parse(&line).and_then(|invocation| match invocation {
            Some(invocation) => session.dispatch(invocation, &mut *io.stdout),
            None => Ok(Flow::Continue),
        });
        match outcome {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(error) => {
                debug!(error = ?error, "command failed");
                let _ = writeln!(io.stderr, "{error}");
            }
        }
    }
}
