//! Implementation of the jobs builtin.

use super::Outcome;
use crate::exec::ExecError;
use crate::proc::JobTable;

/// Print the current list of tracked jobs, one `index: name (status)` line
/// each, in display-index order.
pub fn jobs(table: &JobTable) -> Result<Outcome, ExecError> {
    for (index, job) in table.iter().enumerate() {
        println!("{index}: {} ({})", job.name, job.status.description());
    }
    Ok(Outcome::Continue)
}
