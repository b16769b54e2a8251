//! The shell's signal policy.
//!
//! The shell ignores the two terminal-arbitration signals, SIGTTIN and
//! SIGTTOU, for its entire lifetime. This is what lets it reassign the
//! terminal's foreground group and write to the terminal afterwards without
//! being stopped by the kernel. The dispositions are installed once at
//! startup; children must restore the defaults before exec, or `^Z` and the
//! background-read protections could never stop them.

use crate::common::{exit_without_destructors, perror};

/// The two terminal-arbitration signals the shell ignores.
const TTY_SIGNALS: [libc::c_int; 2] = [libc::SIGTTIN, libc::SIGTTOU];

fn sigaction(sig: libc::c_int, act: &libc::sigaction) -> libc::c_int {
    unsafe { libc::sigaction(sig, act, std::ptr::null_mut()) }
}

/// Install the shell's signal policy. Called once at startup; a failure
/// here means the shell cannot maintain its terminal invariants at all, so
/// it exits.
pub fn signal_set_handlers() {
    let mut act: libc::sigaction = unsafe { std::mem::zeroed() };
    if unsafe { libc::sigfillset(&mut act.sa_mask) } == -1 {
        perror("sigfillset");
        exit_without_destructors(1);
    }
    act.sa_flags = 0;
    act.sa_sigaction = libc::SIG_IGN;
    for sig in TTY_SIGNALS {
        if sigaction(sig, &act) == -1 {
            perror("sigaction");
            exit_without_destructors(1);
        }
    }
}

/// Set the terminal-arbitration signals back to SIG_DFL.
/// This is called after fork - it must be async signal safe.
/// Returns false if any sigaction call failed.
pub fn signal_reset_handlers() -> bool {
    let mut act: libc::sigaction = unsafe { std::mem::zeroed() };
    unsafe { libc::sigemptyset(&mut act.sa_mask) };
    act.sa_flags = 0;
    act.sa_sigaction = libc::SIG_DFL;
    let mut ok = true;
    for sig in TTY_SIGNALS {
        if unsafe { libc::sigaction(sig, &act, std::ptr::null_mut()) } == -1 {
            ok = false;
        }
    }
    ok
}
