//! `bg [%JOB]`.

use crate::errors::{ShellError, ShellResult};
use crate::jobs::JobTable;

use super::BuiltinOutcome;

pub fn run(args: &[String], jobs: &mut JobTable) -> ShellResult<BuiltinOutcome> {
    let id = match args.first() {
        Some(spec) => super::parse_job_spec(spec, jobs)?,
        None => jobs
            .most_recent_stopped_job_id()
            .ok_or_else(|| ShellError::builtin("bg", "no current job", 1))?,
    };
    jobs.put_job_in_background(id, true)?;
    Ok(BuiltinOutcome::Continue(0))
}
