//! Implementation of the wait-for and wait-all builtins.

use super::{parse_job_index, Outcome};
use crate::exec::{self, ExecError};
use crate::proc::JobTable;

/// Block until the background job at the given index stops or terminates.
pub fn wait_for(table: &mut JobTable, tokens: &[String]) -> Result<Outcome, ExecError> {
    let index = parse_job_index(tokens)?;
    exec::await_one(table, index)?;
    Ok(Outcome::Continue)
}

/// Block until every background job has stopped or terminated.
pub fn wait_all(table: &mut JobTable) -> Result<Outcome, ExecError> {
    exec::await_all(table)?;
    Ok(Outcome::Continue)
}
