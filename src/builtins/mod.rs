//! Builtin command dispatch.
//!
//! The dispatcher classifies the first token: job-control builtins drive
//! the supervisor against the job table, directory builtins touch the
//! shell's own state, and anything else is launched as an external command
//! (with a trailing `&` classified as the background marker here, before
//! the supervisor is invoked).

pub mod bg;
pub mod cd;
pub mod fg;
pub mod jobs;
pub mod pwd;
pub mod wait;

use crate::exec::{self, ExecError};
use crate::proc::JobTable;
use crate::tokenizer::strip_background_marker;

/// What the read-eval loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// Parse the job index argument of a job-control builtin (token 1).
pub(crate) fn parse_job_index(tokens: &[String]) -> Result<usize, ExecError> {
    tokens
        .get(1)
        .and_then(|tok| tok.parse::<usize>().ok())
        .ok_or(ExecError::MissingJobIndex)
}

/// Dispatch one parsed command line. `tokens` is non-empty.
pub fn dispatch(table: &mut JobTable, tokens: &mut Vec<String>) -> Result<Outcome, ExecError> {
    let Some(first) = tokens.first() else {
        return Ok(Outcome::Continue);
    };
    match first.as_str() {
        "pwd" => pwd::pwd(),
        "cd" => cd::cd(tokens),
        "exit" => Ok(Outcome::Exit),
        "jobs" => jobs::jobs(table),
        "fg" => fg::fg(table, tokens),
        "bg" => bg::bg(table, tokens),
        "wait-for" => wait::wait_for(table, tokens),
        "wait-all" => wait::wait_all(table),
        _ => {
            let background = strip_background_marker(tokens);
            exec::launch_command(table, tokens, background)?;
            Ok(Outcome::Continue)
        }
    }
}
