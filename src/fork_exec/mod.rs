//! Functions for forking a child process and executing a command inside it.

pub mod flog_safe;
pub mod postfork;

use crate::common::OsError;
use std::time::Duration;

/// The number of times to try to call fork() before giving up.
const FORK_LAPS: usize = 5;

/// The time to sleep between attempts to call fork().
const FORK_SLEEP_TIME: Duration = Duration::from_nanos(1_000_000);

/// A wrapper around fork. If the fork call fails with EAGAIN, it is retried
/// FORK_LAPS times with a slight delay between laps. Returns 0 in the
/// child and the child's pid in the parent.
pub fn execute_fork() -> Result<libc::pid_t, OsError> {
    let mut err = OsError::last("fork");
    for lap in 0..FORK_LAPS {
        let pid = unsafe { libc::fork() };
        if pid >= 0 {
            return Ok(pid);
        }
        err = OsError::last("fork");
        if err.errno.0 != libc::EAGAIN {
            break;
        }
        // Don't sleep on the final lap.
        if lap != FORK_LAPS - 1 {
            std::thread::sleep(FORK_SLEEP_TIME);
        }
    }
    Err(err)
}
