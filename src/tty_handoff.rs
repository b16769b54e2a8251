//! Utility for transferring the tty to a child process group in a scoped
//! way, and reclaiming it after.
//!
//! The terminal's foreground group is external state owned by the kernel's
//! terminal driver. The invariant maintained here is that it always points
//! either at the shell's own group or at the group of a job the shell is
//! currently tracking, and that it is restored to the shell before control
//! returns to the read-eval loop. `TtyHandoff` enforces the restoration by
//! reclaiming in `Drop` if the caller forgot.

use crate::common::OsError;
use crate::flog::flog;
use crate::proc::Pid;
use errno::errno;
use libc::STDIN_FILENO;
use once_cell::sync::OnceCell;

/// Whether stdin is attached to a terminal at all, detected once. When it
/// is not (the shell run under a pipe, or in tests), there is no foreground
/// group to arbitrate and handoff is a no-op.
static SHELL_HAS_TTY: OnceCell<bool> = OnceCell::new();

fn shell_has_tty() -> bool {
    *SHELL_HAS_TTY.get_or_init(|| unsafe { libc::tcgetpgrp(STDIN_FILENO) } >= 0)
}

/// Allows transferring the tty to a job's process group while it runs, in a
/// scoped fashion.
#[derive(Default)]
pub struct TtyHandoff {
    /// The process group which owns the tty, if we transferred it.
    owner: Option<Pid>,
    /// Whether reclaim was called, restoring the tty to the shell.
    reclaimed: bool,
}

impl TtyHandoff {
    pub fn new() -> Self {
        Default::default()
    }

    /// Transfer the terminal to the given process group. No-op when stdin
    /// is not a tty. An unexpected tcsetpgrp failure is fatal to the
    /// session and is returned to the caller.
    pub fn to_process_group(&mut self, pgid: Pid) -> Result<(), OsError> {
        assert!(self.owner.is_none(), "Terminal already transferred");
        if !shell_has_tty() {
            return Ok(());
        }
        if Self::try_transfer(pgid)? {
            self.owner = Some(pgid);
        }
        Ok(())
    }

    /// Reclaim the tty if we transferred it.
    pub fn reclaim(mut self) -> Result<(), OsError> {
        self.reclaim_impl()
    }

    fn reclaim_impl(&mut self) -> Result<(), OsError> {
        assert!(!self.reclaimed, "Terminal already reclaimed");
        self.reclaimed = true;
        if self.owner.take().is_some() {
            flog!(proc_termowner, "shell reclaiming terminal");
            if unsafe { libc::tcsetpgrp(STDIN_FILENO, libc::getpgrp()) } == -1 {
                return Err(OsError::last("tcsetpgrp"));
            }
        }
        Ok(())
    }

    /// The actual transfer. Returns whether the tty is now owned by `pgid`.
    ///
    /// Note it is important to be careful about calling tcsetpgrp: the
    /// shell ignores SIGTTOU, which gives it the power to reassign the tty
    /// even when it does not own it.
    fn try_transfer(pgid: Pid) -> Result<bool, OsError> {
        flog!(proc_termowner, "transferring terminal to pgid", pgid);
        while unsafe { libc::tcsetpgrp(STDIN_FILENO, pgid.as_pid_t()) } != 0 {
            let err = errno().0;
            match err {
                libc::EINTR => continue,
                libc::ENOTTY => {
                    // stdin stopped being a tty (e.g. the terminal went
                    // away). Nothing to hand off.
                    return Ok(false);
                }
                libc::EINVAL => {
                    // Some OSes report EINVAL once the process group has
                    // terminated. The wait that follows will reap it.
                    flog!(proc_termowner, "tcsetpgrp: pgid", pgid, "has terminated");
                    return Ok(false);
                }
                libc::EPERM => {
                    // The child moves itself into its new group between
                    // fork and exec, and tcsetpgrp may not see the group
                    // yet. Retry until the group exists, unless it is
                    // already gone.
                    if unsafe { libc::kill(-pgid.as_pid_t(), 0) } == -1 {
                        flog!(proc_termowner, "tcsetpgrp: pgid", pgid, "is gone");
                        return Ok(false);
                    }
                    flog!(proc_termowner, "tcsetpgrp: EPERM with pgid", pgid, "- retrying");
                    continue;
                }
                _ => return Err(OsError::last("tcsetpgrp")),
            }
        }
        Ok(true)
    }
}

/// The destructor reclaims if the caller did not. A failure here can only
/// be logged; callers that care use the explicit `reclaim()`.
impl Drop for TtyHandoff {
    fn drop(&mut self) {
        if !self.reclaimed {
            if let Err(err) = self.reclaim_impl() {
                flog!(warning, "Could not return shell to foreground:", err);
            }
        }
    }
}
