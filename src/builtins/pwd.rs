//! Implementation of the pwd builtin.

use super::Outcome;
use crate::common::OsError;
use crate::exec::ExecError;
use errno::Errno;

/// Print the shell's current working directory. A getcwd failure leaves
/// the shell without a usable notion of where it is, so it is fatal.
pub fn pwd() -> Result<Outcome, ExecError> {
    match std::env::current_dir() {
        Ok(dir) => {
            println!("{}", dir.display());
            Ok(Outcome::Continue)
        }
        Err(err) => Err(ExecError::Os(OsError {
            syscall: "getcwd",
            errno: Errno(err.raw_os_error().unwrap_or(0)),
        })),
    }
}
