//! Small helpers shared across the shell.

use errno::{errno, Errno};
use std::ffi::CStr;
use std::io::Write;

/// Exit the process without running destructors or atexit handlers.
/// This is the only way a forked child may terminate: running the shell's
/// cleanup in the child would flush stdio buffers and tear down state the
/// parent still owns.
pub fn exit_without_destructors(code: libc::c_int) -> ! {
    unsafe { libc::_exit(code) };
}

/// Print `s: strerror(errno)` to stderr, in the manner of perror(3).
pub fn perror(s: &str) {
    let e = errno().0;
    let mut stderr = std::io::stderr().lock();
    if !s.is_empty() {
        let _ = write!(stderr, "{s}: ");
    }
    let msg = unsafe { CStr::from_ptr(libc::strerror(e)) }.to_bytes();
    let _ = stderr.write_all(msg);
    let _ = stderr.write_all(b"\n");
}

/// A failed OS primitive: the syscall that failed and the errno it left
/// behind. Failures of the process-group, signal, wait and terminal-group
/// primitives are fatal to the shell session; see [`crate::exec::ExecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsError {
    pub syscall: &'static str,
    pub errno: Errno,
}

impl OsError {
    /// Capture the current errno against the named syscall.
    pub fn last(syscall: &'static str) -> Self {
        OsError {
            syscall,
            errno: errno(),
        }
    }
}

impl std::fmt::Display for OsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.syscall, self.errno)
    }
}
