//! Implementation of the cd builtin.

use super::Outcome;
use crate::exec::ExecError;
use std::path::PathBuf;

/// Change the shell's working directory. A bare `cd` goes to `$HOME`.
/// Failures are user errors; the shell continues.
pub fn cd(tokens: &[String]) -> Result<Outcome, ExecError> {
    let target = match tokens.get(1) {
        Some(dir) => PathBuf::from(dir),
        None => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home),
            None => {
                eprintln!("Failed to get home directory");
                return Ok(Outcome::Continue);
            }
        },
    };
    if let Err(err) = std::env::set_current_dir(&target) {
        eprintln!("chdir: {err}");
    }
    Ok(Outcome::Continue)
}
