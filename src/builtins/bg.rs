//! Implementation of the bg builtin.

use super::{parse_job_index, Outcome};
use crate::exec::{self, ExecError};
use crate::proc::JobTable;

/// Resume the job at the given index in the background.
pub fn bg(table: &mut JobTable, tokens: &[String]) -> Result<Outcome, ExecError> {
    let index = parse_job_index(tokens)?;
    exec::resume_job(table, index, false)?;
    Ok(Outcome::Continue)
}
