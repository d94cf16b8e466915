//! `wait [%JOB]`.

use crate::errors::ShellResult;
use crate::jobs::JobTable;

use super::BuiltinOutcome;

pub fn run(args: &[String], jobs: &mut JobTable) -> ShellResult<BuiltinOutcome> {
    match args.first() {
        Some(spec) => {
            let id = super::parse_job_spec(spec, jobs)?;
            let status = jobs.put_job_in_foreground(id, false)?;
            Ok(BuiltinOutcome::Continue(status))
        }
        None => {
            let mut status = 0;
            while let Some(id) = jobs.most_recent_job_id() {
                status = jobs.put_job_in_foreground(id, false)?;
            }
            Ok(BuiltinOutcome::Continue(status))
        }
    }
}
