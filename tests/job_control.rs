//! Job control tests that fork and reap real children.
//!
//! These are serialized: each test must be the only one forking, so that
//! every wait observes its own children. Terminal handoff is exercised in
//! its no-tty form, since cargo's test harness does not give us a tty.

use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use swish::exec::{self, ExecError};
use swish::proc::{JobStatus, JobTable};
use swish::tokenizer::{strip_background_marker, tokenize};

fn launch_bg(table: &mut JobTable, cmd: &str) {
    let tokens = tokenize(cmd);
    exec::launch_command(table, &tokens, true).expect("background launch failed");
}

fn launch_fg(table: &mut JobTable, cmd: &str) {
    let tokens = tokenize(cmd);
    exec::launch_command(table, &tokens, false).expect("foreground launch failed");
}

fn signal_job(table: &JobTable, index: usize, sig: libc::c_int) {
    let pid = table.get(index).expect("no such job").pid;
    assert_eq!(unsafe { libc::kill(pid.as_pid_t(), sig) }, 0);
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("swish_test_{}_{name}", std::process::id()))
}

#[test]
#[serial]
fn background_launch_records_job_and_returns() {
    let mut table = JobTable::new();
    let mut tokens = tokenize("sleep 5 &");
    assert!(strip_background_marker(&mut tokens));
    let start = Instant::now();
    exec::launch_command(&mut table, &tokens, true).unwrap();
    // The shell got control back immediately, without waiting on the child.
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(table.len(), 1);
    let job = table.get(0).unwrap();
    assert_eq!(job.name, "sleep");
    assert_eq!(job.status, JobStatus::Background);

    signal_job(&table, 0, libc::SIGKILL);
    exec::await_one(&mut table, 0).unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn launched_child_is_in_its_own_group_immediately() {
    let mut table = JobTable::new();
    launch_bg(&mut table, "sleep 5");
    let pid = table.get(0).unwrap().pid.as_pid_t();
    // The parent enters the child into its group itself, so the group is
    // observable as soon as the launch returns; this must not depend on
    // how far the child has gotten.
    assert_eq!(unsafe { libc::getpgid(pid) }, pid);

    signal_job(&table, 0, libc::SIGKILL);
    exec::await_one(&mut table, 0).unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn fg_resume_of_stopped_job_runs_to_exit() {
    let mut table = JobTable::new();
    launch_bg(&mut table, "sleep 1");
    signal_job(&table, 0, libc::SIGSTOP);
    exec::await_one(&mut table, 0).unwrap();
    assert_eq!(table.get(0).unwrap().status, JobStatus::Stopped);

    // fg: continue the job, block until it finishes, and drop the record.
    exec::resume_job(&mut table, 0, true).unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn foreground_launch_blocks_until_exit() {
    let mut table = JobTable::new();
    let start = Instant::now();
    launch_fg(&mut table, "sleep 1");
    assert!(start.elapsed() >= Duration::from_millis(900));
    // It exited; nothing to track.
    assert!(table.is_empty());
}

#[test]
#[serial]
fn await_one_removes_exited_job() {
    let mut table = JobTable::new();
    launch_bg(&mut table, "true");
    exec::await_one(&mut table, 0).unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn stop_resume_and_kill_cycle() {
    let mut table = JobTable::new();
    launch_bg(&mut table, "sleep 30");
    signal_job(&table, 0, libc::SIGSTOP);

    // The wait observes the stop and updates the record in place.
    exec::await_one(&mut table, 0).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0).unwrap().status, JobStatus::Stopped);

    // Stopped jobs are not awaited; the wait could never finish.
    assert!(matches!(
        exec::await_one(&mut table, 0),
        Err(ExecError::JobIsStopped(0))
    ));

    // bg: status flips to Background without blocking.
    let start = Instant::now();
    exec::resume_job(&mut table, 0, false).unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(table.get(0).unwrap().status, JobStatus::Background);

    signal_job(&table, 0, libc::SIGKILL);
    exec::await_one(&mut table, 0).unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn await_all_keeps_only_stopped_jobs() {
    let mut table = JobTable::new();
    launch_bg(&mut table, "true");
    launch_bg(&mut table, "sleep 30");
    launch_bg(&mut table, "true");
    signal_job(&table, 1, libc::SIGSTOP);

    exec::await_all(&mut table).unwrap();
    assert_eq!(table.len(), 1);
    let survivor = table.get(0).unwrap();
    assert_eq!(survivor.name, "sleep");
    assert_eq!(survivor.status, JobStatus::Stopped);

    exec::resume_job(&mut table, 0, false).unwrap();
    signal_job(&table, 0, libc::SIGKILL);
    exec::await_one(&mut table, 0).unwrap();
    assert!(table.is_empty());
}

#[test]
#[serial]
fn bad_index_leaves_table_unchanged() {
    let mut table = JobTable::new();
    launch_bg(&mut table, "sleep 30");

    assert!(matches!(
        exec::resume_job(&mut table, 5, true),
        Err(ExecError::BadJobIndex(5))
    ));
    assert!(matches!(
        exec::resume_job(&mut table, 5, false),
        Err(ExecError::BadJobIndex(5))
    ));
    assert!(matches!(
        exec::await_one(&mut table, 5),
        Err(ExecError::BadJobIndex(5))
    ));
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0).unwrap().status, JobStatus::Background);

    signal_job(&table, 0, libc::SIGKILL);
    exec::await_one(&mut table, 0).unwrap();
}

#[test]
#[serial]
fn output_redirection_round_trip() {
    let out = temp_path("out.txt");
    let _ = fs::remove_file(&out);

    let mut table = JobTable::new();
    let tokens = tokenize(&format!("echo hi > {}", out.display()));
    assert_eq!(&tokens[..3], &["echo", "hi", ">"]);
    exec::launch_command(&mut table, &tokens, false).unwrap();
    assert!(table.is_empty());
    // The redirection tokens were not passed to the program.
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");

    // >> appends instead of truncating.
    launch_fg(&mut table, &format!("echo bye >> {}", out.display()));
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\nbye\n");

    // > truncates what was there.
    launch_fg(&mut table, &format!("echo again > {}", out.display()));
    assert_eq!(fs::read_to_string(&out).unwrap(), "again\n");

    let _ = fs::remove_file(&out);
}

#[test]
#[serial]
fn input_and_output_redirection_combine() {
    let src = temp_path("in.txt");
    let dst = temp_path("copied.txt");
    fs::write(&src, "some input\n").unwrap();
    let _ = fs::remove_file(&dst);

    let mut table = JobTable::new();
    launch_fg(
        &mut table,
        &format!("cat < {} > {}", src.display(), dst.display()),
    );
    assert_eq!(fs::read_to_string(&dst).unwrap(), "some input\n");

    let _ = fs::remove_file(&src);
    let _ = fs::remove_file(&dst);
}

#[test]
#[serial]
fn child_exec_failure_is_an_observable_exit() {
    let mut table = JobTable::new();
    // The launch itself succeeds; the failure surfaces as the child's
    // non-zero exit, reaped by the wait.
    launch_bg(&mut table, "definitely-not-a-real-command-12345");
    exec::await_one(&mut table, 0).unwrap();
    assert!(table.is_empty());
}
