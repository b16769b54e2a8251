//! Utilities for keeping track of jobs and their kernel-observed state.
//!
//! A job is a child process the shell launched that is currently either
//! running in the background or stopped. Foreground processes are not
//! tracked here: while a command runs in the foreground the shell is blocked
//! waiting on it, and on return it either terminated (nothing to track) or
//! stopped (a record is created). Termination is represented by absence
//! from the table.
//!
//! Statuses are never guessed: a record's status is updated only
//! immediately after a wait call reports a new kernel state.

use std::collections::TryReserveError;
use std::num::NonZeroI32;

/// A type-safe equivalent to [`libc::pid_t`].
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Pid(NonZeroI32);

impl Pid {
    #[inline(always)]
    pub fn new(pid: libc::pid_t) -> Self {
        Self(
            NonZeroI32::new(pid)
                .filter(|p| p.get() > 0)
                .expect("PID must be greater than zero"),
        )
    }

    #[inline(always)]
    pub fn get(&self) -> i32 {
        self.0.get()
    }

    #[inline(always)]
    pub fn as_pid_t(&self) -> libc::pid_t {
        self.get()
    }
}

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.get(), f)
    }
}

/// A value type wrapping the raw status from a waitpid() call, with the
/// exited/signaled/stopped logic in one place.
#[derive(Debug, Copy, Clone)]
pub struct ProcStatus(i32);

impl ProcStatus {
    /// Construct from a status returned from a waitpid call.
    pub fn from_waitpid(status: i32) -> ProcStatus {
        ProcStatus(status)
    }

    /// Return if the process is stopped (as in SIGTSTP).
    pub fn stopped(&self) -> bool {
        libc::WIFSTOPPED(self.0)
    }

    /// Return if the process exited normally (not via a signal).
    pub fn normal_exited(&self) -> bool {
        libc::WIFEXITED(self.0)
    }

    /// Return if the process exited because of a signal.
    pub fn signal_exited(&self) -> bool {
        libc::WIFSIGNALED(self.0)
    }

    /// Return the exit code, given that we normal exited.
    pub fn exit_code(&self) -> i32 {
        debug_assert!(self.normal_exited(), "Process is not normal exited");
        libc::WEXITSTATUS(self.0)
    }

    /// Return the signal code, given that we signal exited.
    pub fn signal_code(&self) -> libc::c_int {
        debug_assert!(self.signal_exited(), "Process is not signal exited");
        libc::WTERMSIG(self.0)
    }
}

/// The two trackable states of a job. Foreground execution is transient and
/// not represented; termination is represented by removal from the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Running, not terminal-owning.
    Background,
    /// Not running, resumable via fg/bg.
    Stopped,
}

impl JobStatus {
    /// The user-visible description, as printed by the jobs builtin.
    pub fn description(&self) -> &'static str {
        match self {
            JobStatus::Background => "background",
            JobStatus::Stopped => "stopped",
        }
    }
}

/// One tracked child process.
#[derive(Debug)]
pub struct Job {
    pub pid: Pid,
    /// The command name (argv[0]), an owned copy.
    pub name: String,
    pub status: JobStatus,
}

/// An insertion-ordered table of background and stopped jobs.
///
/// Jobs are addressed by their current display index, which is dense:
/// removing an entry shifts the indices of everything after it. Callers
/// must resolve an index immediately before using it and must not cache
/// indices across mutating calls.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append a new record. Fails only if the backing storage cannot grow.
    pub fn add(
        &mut self,
        pid: Pid,
        name: &str,
        status: JobStatus,
    ) -> Result<(), TryReserveError> {
        debug_assert!(
            self.jobs.iter().all(|j| j.pid != pid),
            "pid already tracked"
        );
        self.jobs.try_reserve(1)?;
        self.jobs.push(Job {
            pid,
            name: name.to_owned(),
            status,
        });
        Ok(())
    }

    /// The record at display index `index`, or None if out of range.
    pub fn get(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Job> {
        self.jobs.get_mut(index)
    }

    /// Delete the record at `index`, preserving the relative order of the
    /// remaining entries. Returns the removed job, or None if out of range.
    pub fn remove(&mut self, index: usize) -> Option<Job> {
        if index < self.jobs.len() {
            Some(self.jobs.remove(index))
        } else {
            None
        }
    }

    /// Delete every record whose status matches, in a single pass.
    pub fn remove_by_status(&mut self, status: JobStatus) {
        self.jobs.retain(|job| job.status != status);
    }

    /// Drop all records. Idempotent. Used on shell exit, where tracked
    /// children are freed but not signaled.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn p(pid: i32) -> Pid {
        Pid::new(pid)
    }

    #[test]
    fn test_add_get_remove() {
        let mut table = JobTable::new();
        assert!(table.is_empty());
        table.add(p(100), "sleep", JobStatus::Background).unwrap();
        table.add(p(101), "cat", JobStatus::Stopped).unwrap();
        table.add(p(102), "vi", JobStatus::Stopped).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1).unwrap().name, "cat");
        assert!(table.get(3).is_none());

        // Removal preserves the order of the remaining entries and
        // re-issues indices densely.
        let removed = table.remove(1).unwrap();
        assert_eq!(removed.pid, p(101));
        assert_eq!(table.get(0).unwrap().name, "sleep");
        assert_eq!(table.get(1).unwrap().name, "vi");
        assert!(table.remove(2).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_length_tracks_adds_and_removes() {
        let mut table = JobTable::new();
        let mut adds = 0usize;
        let mut removes = 0usize;
        for pid in 1..=20 {
            table.add(p(pid), "job", JobStatus::Background).unwrap();
            adds += 1;
        }
        for _ in 0..5 {
            assert!(table.remove(0).is_some());
            removes += 1;
        }
        assert_eq!(table.len(), adds - removes);

        // No two live records share a pid.
        let pids: HashSet<i32> = table.iter().map(|j| j.pid.get()).collect();
        assert_eq!(pids.len(), table.len());
    }

    #[test]
    fn test_remove_by_status_single_pass() {
        let mut table = JobTable::new();
        // Adjacent matching entries exercise the in-place removal sweep:
        // a naive index walk would skip the second of each pair.
        table.add(p(1), "a", JobStatus::Background).unwrap();
        table.add(p(2), "b", JobStatus::Background).unwrap();
        table.add(p(3), "c", JobStatus::Stopped).unwrap();
        table.add(p(4), "d", JobStatus::Background).unwrap();
        table.add(p(5), "e", JobStatus::Background).unwrap();
        table.remove_by_status(JobStatus::Background);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().name, "c");
    }

    #[test]
    fn test_clear_idempotent() {
        let mut table = JobTable::new();
        table.add(p(7), "x", JobStatus::Stopped).unwrap();
        table.clear();
        assert!(table.is_empty());
        table.clear();
        assert!(table.is_empty());
    }
}
