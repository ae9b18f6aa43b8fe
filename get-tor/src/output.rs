//! Progress output helpers.

use std::fmt::Display;
use std::io::{self, Write};

/// Write one progress line, ignoring failures.
///
/// Progress output is best effort; a closed stderr must not abort staging.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// A writer that discards everything, used for `--quiet`.
#[must_use]
pub fn quiet_sink() -> io::Sink {
    io::sink()
}
