//! The job control supervisor.
//!
//! This module owns the state transitions that keep the job table
//! consistent with kernel process state: launching foreground and
//! background commands, resuming jobs with fg/bg, and the blocking waits
//! behind wait-for and wait-all. Statuses are updated only immediately
//! after a wait call reports them, never inferred.

use crate::common::OsError;
use crate::flog::flog;
use crate::fork_exec::{
    execute_fork,
    postfork::{child_run_command, execute_setpgid},
};
use crate::proc::{JobStatus, JobTable, Pid, ProcStatus};
use crate::tty_handoff::TtyHandoff;
use errno::errno;
use std::collections::TryReserveError;

/// Errors from the supervisor entry points.
///
/// User errors abort the current command and the read-eval loop continues.
/// `Os` failures are fatal to the whole session: once a process-group,
/// signal, wait or terminal primitive fails unexpectedly, the shell's own
/// terminal and process-group invariants can no longer be trusted.
#[derive(Debug)]
pub enum ExecError {
    /// No job at the given index.
    BadJobIndex(usize),
    /// A job-control builtin was not given a valid index argument.
    MissingJobIndex,
    /// wait-for on a stopped job, which would block forever.
    JobIsStopped(usize),
    /// The job table cannot grow.
    Capacity(TryReserveError),
    /// An OS primitive failed.
    Os(OsError),
}

impl ExecError {
    /// True for failures after which shell invariants cannot be trusted
    /// and the session must end.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Os(_))
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::BadJobIndex(index) => write!(f, "job index {index} out of bounds"),
            ExecError::MissingJobIndex => write!(f, "expected a job index"),
            ExecError::JobIsStopped(index) => {
                write!(f, "job {index} is stopped, not a background job")
            }
            ExecError::Capacity(err) => write!(f, "job table cannot grow: {err}"),
            ExecError::Os(err) => write!(f, "{err}"),
        }
    }
}

impl From<OsError> for ExecError {
    fn from(err: OsError) -> Self {
        ExecError::Os(err)
    }
}

impl From<TryReserveError> for ExecError {
    fn from(err: TryReserveError) -> Self {
        ExecError::Capacity(err)
    }
}

/// Block until `pid` exits, is killed, or stops. WUNTRACED is what makes
/// stop events visible; without it a ^Z'd foreground job would leave the
/// shell waiting forever.
fn wait_on_job(pid: Pid) -> Result<ProcStatus, ExecError> {
    let mut status: libc::c_int = 0;
    loop {
        if unsafe { libc::waitpid(pid.as_pid_t(), &mut status, libc::WUNTRACED) } == -1 {
            if errno().0 == libc::EINTR {
                continue;
            }
            return Err(OsError::last("waitpid").into());
        }
        let status = ProcStatus::from_waitpid(status);
        flog!(
            proc_reap,
            "reaped pid",
            pid,
            if status.stopped() { "(stopped)" } else { "(terminated)" }
        );
        return Ok(status);
    }
}

fn send_sigcont(pid: Pid) -> Result<(), ExecError> {
    if unsafe { libc::kill(pid.as_pid_t(), libc::SIGCONT) } == -1 {
        return Err(OsError::last("kill").into());
    }
    Ok(())
}

/// Fork and run `tokens` as an external command. `background` is true when
/// the dispatcher stripped a trailing `&`.
///
/// Foreground launches transfer the terminal to the child's group, block
/// until the child exits or stops, and always restore the shell as the
/// terminal owner before returning - even when the wait reported
/// termination, because ownership was transferred unconditionally at
/// launch. A child observed to stop is recorded as a Stopped job.
/// Background launches transfer nothing and do not block.
pub fn launch_command(
    jobs: &mut JobTable,
    tokens: &[String],
    background: bool,
) -> Result<(), ExecError> {
    let Some(name) = tokens.first() else {
        return Ok(());
    };
    flog!(
        proc_job_run,
        "launching",
        name,
        if background { "(background)" } else { "(foreground)" }
    );

    let pid = execute_fork()?;
    if pid == 0 {
        // Child. Never returns.
        child_run_command(tokens);
    }
    let pid = Pid::new(pid);

    // Enter the child into its new group from this side too. The child does
    // the same between fork and exec; whichever side runs first wins. Without
    // this the terminal transfer below can race the child's setpgid, observe
    // a group that does not exist yet, and give up, leaving a foreground
    // child to be stopped by the kernel on its first terminal access.
    let err = execute_setpgid(pid.as_pid_t(), pid.as_pid_t(), true);
    // Note this error is not fatal.
    if err != 0 {
        flog!(proc_pgroup, "setpgid in parent failed for pid", pid, "error", err);
    }

    if background {
        // The shell retains terminal ownership and does not wait.
        jobs.add(pid, name, JobStatus::Background)?;
        return Ok(());
    }

    // The child's process group is keyed by its own pid.
    let mut handoff = TtyHandoff::new();
    handoff.to_process_group(pid)?;
    let wait_result = wait_on_job(pid);
    // Restore the shell as terminal owner before touching the table; if
    // the wait itself failed, the handoff's Drop still attempts this.
    handoff.reclaim()?;
    let status = wait_result?;
    if status.stopped() {
        flog!(proc_job_run, "job", name, "stopped");
        jobs.add(pid, name, JobStatus::Stopped)?;
    }
    Ok(())
}

/// Resume the job at `index`, in the foreground if `foreground` is true.
///
/// Foreground: transfer the terminal, SIGCONT, block until the job exits
/// or stops again, remove it from the table unless it stopped, and always
/// restore the shell as terminal owner. Background: flip the status to
/// Background and SIGCONT; no transfer and no wait, so the shell stays
/// responsive.
pub fn resume_job(jobs: &mut JobTable, index: usize, foreground: bool) -> Result<(), ExecError> {
    let Some(job) = jobs.get_mut(index) else {
        return Err(ExecError::BadJobIndex(index));
    };
    let pid = job.pid;
    flog!(
        proc_job_run,
        "resuming job",
        index,
        if foreground { "(foreground)" } else { "(background)" }
    );

    if !foreground {
        job.status = JobStatus::Background;
        return send_sigcont(pid);
    }

    let mut handoff = TtyHandoff::new();
    handoff.to_process_group(pid)?;
    send_sigcont(pid)?;
    let wait_result = wait_on_job(pid);
    handoff.reclaim()?;
    let status = wait_result?;
    if !status.stopped() {
        // Exited or killed; it is no longer ours to track. If it stopped
        // again it stays in the table with its status unchanged.
        jobs.remove(index);
    }
    Ok(())
}

/// wait-for: block until the background job at `index` exits or stops.
/// Stopped jobs are refused - the shell itself would have to resume them
/// first, so the wait could never finish.
pub fn await_one(jobs: &mut JobTable, index: usize) -> Result<(), ExecError> {
    let Some(job) = jobs.get(index) else {
        return Err(ExecError::BadJobIndex(index));
    };
    if job.status == JobStatus::Stopped {
        return Err(ExecError::JobIsStopped(index));
    }
    let pid = job.pid;
    let status = wait_on_job(pid)?;
    if status.stopped() {
        if let Some(job) = jobs.get_mut(index) {
            job.status = JobStatus::Stopped;
        }
    } else {
        jobs.remove(index);
    }
    Ok(())
}

/// wait-all: block on every background job in turn. Jobs observed to stop
/// have their status updated in place; removal of the terminated ones is
/// deferred to a single bulk pass, because mutating the table while
/// iterating would shift the indices under the sweep.
pub fn await_all(jobs: &mut JobTable) -> Result<(), ExecError> {
    for index in 0..jobs.len() {
        let Some(job) = jobs.get(index) else {
            break;
        };
        if job.status != JobStatus::Background {
            continue;
        }
        let pid = job.pid;
        let status = wait_on_job(pid)?;
        if status.stopped() {
            if let Some(job) = jobs.get_mut(index) {
                job.status = JobStatus::Stopped;
            }
        }
    }
    // Everything still marked Background has terminated.
    jobs.remove_by_status(JobStatus::Background);
    Ok(())
}
