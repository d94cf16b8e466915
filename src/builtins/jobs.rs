//! `jobs [-p]` -- lists background and stopped jobs.

use crate::errors::ShellResult;
use crate::jobs::JobTable;

use super::BuiltinOutcome;

pub fn run(args: &[String], jobs: &JobTable) -> ShellResult<BuiltinOutcome> {
    let pids_only = args.iter().any(|a| a == "-p");
    for job in jobs.jobs() {
        if pids_only {
            if let Some(pgid) = job.pgid {
                println!("{}", pgid.as_raw());
            }
        } else {
            println!("{job}");
        }
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use nix::unistd::Pid;

    use super::*;

    fn table_with_one_job() -> JobTable {
        let mut table = JobTable::init(-1).unwrap();
        let id = table.create_job("sleep 1".into(), false).unwrap();
        table.add_process(id, Pid::from_raw(4242));
        table
    }

    #[test]
    fn jobs_p_prints_pids_only() {
        let table = table_with_one_job();
        run(&["-p".to_string()], &table).unwrap();
    }

    #[test]
    fn jobs_with_no_flags_prints_the_full_line() {
        let table = table_with_one_job();
        run(&[], &table).unwrap();
    }
}
