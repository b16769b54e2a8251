//! Implementation of the fg builtin.

use super::{parse_job_index, Outcome};
use crate::exec::{self, ExecError};
use crate::proc::JobTable;

/// Move the job at the given index into the foreground.
pub fn fg(table: &mut JobTable, tokens: &[String]) -> Result<Outcome, ExecError> {
    let index = parse_job_index(tokens)?;
    exec::resume_job(table, index, true)?;
    Ok(Outcome::Continue)
}
