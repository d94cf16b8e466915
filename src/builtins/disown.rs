//! `disown [%JOB]`.

use crate::errors::{ShellError, ShellResult};
use crate::jobs::JobTable;

use super::BuiltinOutcome;

pub fn run(args: &[String], jobs: &mut JobTable) -> ShellResult<BuiltinOutcome> {
    let id = match args.first() {
        Some(spec) => super::parse_job_spec(spec, jobs)?,
        None => jobs
            .most_recent_job_id()
            .ok_or_else(|| ShellError::builtin("disown", "no current job", 1))?,
    };
    if jobs.disown(id) {
        Ok(BuiltinOutcome::Continue(0))
    } else {
        Err(ShellError::NoSuchJob(id.to_string()))
    }
}
