//! The stuff that happens in the child, after fork and before exec.
//!
//! Nothing here may return into shared shell state: on success exec
//! replaces the process image, and every failure path reports and _exits.
//! Reporting goes through flog_safe. The shell is single-threaded, so
//! allocating between fork and exec cannot deadlock on a lock held by
//! another thread.

use crate::common::exit_without_destructors;
use crate::fork_exec::flog_safe::flog_safe;
use crate::null_terminated_array::OwningNullTerminatedArray;
use crate::redirection::{partition_tokens, RedirectionError, RedirectionSpec};
use crate::signal::signal_reset_handlers;
use errno::errno;
use std::ffi::{CStr, CString};
use std::os::fd::AsRawFd;
use std::path::Path;

/// Execute setpgid, retrying EINTR. Returns 0 on success, or the value of
/// errno on failure.
///
/// Both sides of the fork call this with the same arguments, so the group
/// exists before the parent assigns the terminal to it no matter which side
/// runs first. That makes two errors benign in the parent: EACCES, because
/// the child has already called exec (so its own setpgid already ran), and
/// on BSDs ESRCH, because a child that forked, exec'd and exited may no
/// longer be considered extant.
pub fn execute_setpgid(pid: libc::pid_t, pgroup: libc::pid_t, is_parent: bool) -> i32 {
    loop {
        if unsafe { libc::setpgid(pid, pgroup) } == 0 {
            return 0;
        }
        let err = errno().0;
        if err == libc::EACCES && is_parent {
            // Our child has called exec(). An unavoidable benign race.
            return 0;
        }
        if err == libc::EINTR {
            // Paranoia.
            continue;
        }
        #[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd"))]
        if err == libc::ESRCH && is_parent {
            // See https://bugs.freebsd.org/bugzilla/show_bug.cgi?id=251227
            return 0;
        }
        return err;
    }
}

/// Open the file named by a redirection clause and dup it onto the
/// corresponding standard stream. Returns false on failure.
fn apply_redirection(spec: &RedirectionSpec) -> bool {
    let fd = loop {
        match nix::fcntl::open(
            Path::new(&spec.target),
            spec.mode.oflags(),
            spec.mode.file_creation_mode(),
        ) {
            Ok(fd) => break fd,
            Err(nix::errno::Errno::EINTR) => continue,
            Err(err) => {
                flog_safe!(
                    exec,
                    "Failed to open '",
                    spec.target.as_str(),
                    "': ",
                    err.desc()
                );
                return false;
            }
        }
    };
    if unsafe { libc::dup2(fd.as_raw_fd(), spec.mode.target_fd()) } == -1 {
        flog_safe!(exec, "dup2: error number ", errno().0);
        return false;
    }
    // fd drops here, closing the original descriptor; the dup lives on.
    true
}

/// Set up the freshly forked child and exec the command described by
/// `tokens`. Never returns: exec replaces the process image, and every
/// failure path terminates the child with a non-zero status.
pub fn child_run_command(tokens: &[String]) -> ! {
    // Move into our own process group, keyed by our own pid, so the
    // terminal can be assigned to us independently of the shell.
    let pid = unsafe { libc::getpid() };
    let err = execute_setpgid(pid, pid, false);
    if err != 0 {
        flog_safe!(error, "setpgid: error number ", err);
        exit_without_destructors(1);
    }

    // Back to default dispositions for the terminal-arbitration signals.
    // The shell's ignore policy must not leak into the child, or ^Z could
    // never stop it.
    if !signal_reset_handlers() {
        flog_safe!(error, "sigaction failed in child");
        exit_without_destructors(1);
    }

    // Split off the trailing redirection clauses and build argv from the
    // leading run of plain arguments.
    let (args, redirections) = match partition_tokens(tokens) {
        Ok(parts) => parts,
        Err(RedirectionError::ExpectedOperator(_)) => {
            flog_safe!(exec, "arguments may not follow a redirection");
            exit_without_destructors(1);
        }
        Err(RedirectionError::MissingTarget(_)) => {
            flog_safe!(exec, "redirection is missing a filename");
            exit_without_destructors(1);
        }
    };
    if args.is_empty() {
        flog_safe!(exec, "missing command name");
        exit_without_destructors(1);
    }
    let mut argv = Vec::with_capacity(args.len());
    for arg in args {
        match CString::new(arg.as_str()) {
            Ok(cstr) => argv.push(cstr),
            Err(_) => {
                flog_safe!(exec, "argument contains an interior NUL byte");
                exit_without_destructors(1);
            }
        }
    }
    let argv = OwningNullTerminatedArray::new(argv);

    // Apply redirections left to right. Any open failure aborts before
    // exec; the program must not run with a half-applied redirection set.
    for spec in &redirections {
        if !apply_redirection(spec) {
            exit_without_destructors(1);
        }
    }

    // Exec. A return means the process image was not replaced.
    unsafe { libc::execvp(*argv.get(), argv.get()) };
    let err = errno().0;
    if let Some(actual_cmd) = argv.iter().next() {
        safe_report_exec_error(err, actual_cmd.as_c_str());
    }
    exit_without_destructors(1)
}

/// Report the reason exec failed. Async-signal-safe.
fn safe_report_exec_error(err: i32, actual_cmd: &CStr) {
    match err {
        libc::ENOENT => {
            flog_safe!(
                exec,
                "Failed to execute process '",
                actual_cmd,
                "': The file does not exist or could not be executed."
            );
        }
        libc::EACCES => {
            flog_safe!(
                exec,
                "Failed to execute process '",
                actual_cmd,
                "': The file could not be accessed."
            );
        }
        libc::ENOEXEC => {
            flog_safe!(
                exec,
                "Failed to execute process '",
                actual_cmd,
                "': The file could not be run by the operating system."
            );
        }
        libc::E2BIG => {
            flog_safe!(
                exec,
                "Failed to execute process '",
                actual_cmd,
                "': The argument list exceeds the OS limit."
            );
        }
        libc::ENOMEM => {
            flog_safe!(exec, "Out of memory");
        }
        err => {
            flog_safe!(
                exec,
                "Failed to execute process '",
                actual_cmd,
                "', unknown error number ",
                err
            );
        }
    }
}
