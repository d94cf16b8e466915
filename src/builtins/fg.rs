//! `fg [%JOB]`.

use crate::errors::{ShellError, ShellResult};
use crate::jobs::JobTable;

use super::BuiltinOutcome;

pub fn run(args: &[String], jobs: &mut JobTable) -> ShellResult<BuiltinOutcome> {
    let id = match args.first() {
        Some(spec) => super::parse_job_spec(spec, jobs)?,
        None => jobs
            .most_recent_job_id()
            .ok_or_else(|| ShellError::builtin("fg", "no current job", 1))?,
    };
    let status = jobs.put_job_in_foreground(id, true)?;
    Ok(BuiltinOutcome::Continue(status))
}
