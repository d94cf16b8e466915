//! Job Control (C6): process creation, process groups, terminal ownership,
//! and the job state machine.
//!
//! Grounded directly in the job-control model of the C original
//! (`jobs.h`/`jobs.c`): a dense `[1, MAX_JOBS]` job-id space, a job owning an
//! ordered list of processes, and exactly three call sites that ever move
//! the controlling terminal. The teacher's `job_control.rs` supplied the
//! `nix`-based waitpid loop this module generalizes to full pipelines.

use std::fmt;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};

use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::termios::{self, Termios};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, Pid};

use crate::errors::ShellResult;

/// Dense job-id ceiling (§3).
pub const MAX_JOBS: usize = 20;

/// Lifecycle state of a [`Job`] (§4.6's state machine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    /// At least one member process is runnable and none are stopped.
    Running,
    /// At least one member is stopped and none are still running.
    Stopped,
    /// Every member has completed normally.
    Done,
    /// The job ended via an unhandled signal.
    Terminated,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Running => "Running",
            JobState::Stopped => "Stopped",
            JobState::Done => "Done",
            JobState::Terminated => "Terminated",
        };
        write!(f, "{s}")
    }
}

/// A single process belonging to a [`Job`].
#[derive(Debug)]
pub struct Process {
    pub pid: Pid,
    pub completed: bool,
    pub stopped: bool,
    /// Raw wait-status encoding, set once the process has stopped or
    /// completed at least once.
    pub status: Option<i32>,
}

impl Process {
    fn new(pid: Pid) -> Process {
        Process {
            pid,
            completed: false,
            stopped: false,
            status: None,
        }
    }

    /// Exit code if the process ran to completion normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.and_then(|status| {
            if is_wifexited(status) {
                Some(wexitstatus(status))
            } else if is_wifsignaled(status) {
                Some(128 + wtermsig(status))
            } else {
                None
            }
        })
    }
}

/// A logical unit of work: one process for a simple command, one process per
/// pipeline stage sharing a single process group for a pipeline.
#[derive(Debug)]
pub struct Job {
    pub id: usize,
    pub pgid: Option<Pid>,
    pub command: String,
    pub state: JobState,
    pub foreground: bool,
    pub notified: bool,
    pub saved_tmodes: Option<Termios>,
    pub processes: Vec<Process>,
}

impl Job {
    fn new(id: usize, command: String, foreground: bool) -> Job {
        Job {
            id,
            pgid: None,
            command,
            state: JobState::Running,
            foreground,
            notified: false,
            saved_tmodes: None,
            processes: Vec::new(),
        }
    }

    /// `job.state = DONE ⇔ all members completed ∧ no member stopped` (§3).
    pub fn is_completed(&self) -> bool {
        self.processes.iter().all(|p| p.completed)
    }

    /// `job.state = STOPPED ⇔ at least one stopped ∧ no live running` (§3).
    pub fn is_stopped(&self) -> bool {
        self.processes.iter().all(|p| p.completed || p.stopped)
            && self.processes.iter().any(|p| p.stopped)
    }

    /// Exit status of the rightmost process, used as the pipeline's overall
    /// exit status (§5).
    pub fn last_exit_code(&self) -> i32 {
        self.processes
            .last()
            .and_then(Process::exit_code)
            .unwrap_or(0)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\t\t{}", self.id, self.state, self.command)
    }
}

/// Owns the dense job table and the terminal/process-group state needed to
/// arbitrate foreground ownership (§4.6's "Terminal ownership discipline").
pub struct JobTable {
    slots: Vec<Option<Job>>,
    pub shell_pgid: Pid,
    pub shell_terminal: RawFd,
    pub is_interactive: bool,
    pub shell_tmodes: Option<Termios>,
}

impl JobTable {
    /// Performs §4.6 "Initialization": claims the terminal if interactive
    /// and ignores the job-control signal set (SIGINT/SIGQUIT/SIGTSTP/
    /// SIGTTIN/SIGTTOU) on the shell process itself. Does not install a
    /// SIGCHLD handler; reaping is polling-only, from [`Self::reap_all`] and
    /// [`Self::notify_changed`] -- see the "Job reaping" entry in
    /// `DESIGN.md` for why a real handler was rejected rather than merely
    /// skipped.
    pub fn init(terminal: RawFd) -> ShellResult<JobTable> {
        let is_interactive = unistd::isatty(terminal).unwrap_or(false);
        let mut shell_pgid = unistd::getpgrp();

        if is_interactive {
            let fd = unsafe { BorrowedFd::borrow_raw(terminal) };
            while termios::tcgetattr(fd).is_ok() && unistd::tcgetpgrp(fd).unwrap_or(shell_pgid) != shell_pgid {
                let _ = signal::kill(Pid::from_raw(-shell_pgid.as_raw()), Signal::SIGTTIN);
                shell_pgid = unistd::getpgrp();
            }

            unsafe {
                let _ = signal::signal(Signal::SIGINT, SigHandler::SigIgn);
                let _ = signal::signal(Signal::SIGQUIT, SigHandler::SigIgn);
                let _ = signal::signal(Signal::SIGTSTP, SigHandler::SigIgn);
                let _ = signal::signal(Signal::SIGTTIN, SigHandler::SigIgn);
                let _ = signal::signal(Signal::SIGTTOU, SigHandler::SigIgn);
            }

            shell_pgid = unistd::getpid();
            unistd::setpgid(Pid::from_raw(0), shell_pgid)?;
            unistd::tcsetpgrp(fd, shell_pgid)?;
        }

        let shell_tmodes = if is_interactive {
            termios::tcgetattr(unsafe { BorrowedFd::borrow_raw(terminal) }).ok()
        } else {
            None
        };

        Ok(JobTable {
            slots: (0..MAX_JOBS).map(|_| None).collect(),
            shell_pgid,
            shell_terminal: terminal,
            is_interactive,
            shell_tmodes,
        })
    }

    fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Allocates a job in the first empty slot; `id = slot + 1`, preserving
    /// the coupling the design notes call out (disowning leaves a hole
    /// rather than compacting the table).
    pub fn create_job(&mut self, command: String, foreground: bool) -> ShellResult<usize> {
        let slot = self
            .find_empty_slot()
            .ok_or_else(|| crate::errors::ShellError::builtin("jobs", "too many jobs", 1))?;
        self.slots[slot] = Some(Job::new(slot + 1, command, foreground));
        Ok(slot + 1)
    }

    pub fn job_mut(&mut self, id: usize) -> Option<&mut Job> {
        self.slots.get_mut(id.checked_sub(1)?)?.as_mut()
    }

    /// Appends a freshly forked process to `id`, seeding the job's pgid from
    /// the first process added (the "first process also seeds the pgid"
    /// rule from §4.6's "Launching a job").
    pub fn add_process(&mut self, id: usize, pid: Pid) {
        if let Some(job) = self.job_mut(id) {
            if job.pgid.is_none() {
                job.pgid = Some(pid);
            }
            job.processes.push(Process::new(pid));
        }
    }

    pub fn job(&self, id: usize) -> Option<&Job> {
        self.slots.get(id.checked_sub(1)?)?.as_ref()
    }

    /// All live jobs, in table order, for the `jobs` builtin.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Removes a job from the table without signaling any of its processes
    /// (`disown`); its exit is no longer tracked.
    pub fn disown(&mut self, id: usize) -> bool {
        match self.slots.get_mut(id.checked_sub(1).unwrap_or(usize::MAX)) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, id: usize) {
        if let Some(slot) = self.slots.get_mut(id.saturating_sub(1)) {
            *slot = None;
        }
    }

    /// The most-recently created job still in the table, for a bare `fg`.
    pub fn most_recent_job_id(&self) -> Option<usize> {
        self.slots.iter().rposition(Option::is_some).map(|i| i + 1)
    }

    /// The most-recently created stopped job, for a bare `bg`.
    pub fn most_recent_stopped_job_id(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .find(|(_, j)| matches!(j, Some(job) if job.state == JobState::Stopped))
            .map(|(i, _)| i + 1)
    }

    fn find_process_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.slots
            .iter_mut()
            .filter_map(Option::as_mut)
            .flat_map(|job| job.processes.iter_mut())
            .find(|p| p.pid == pid)
    }

    fn update_process_status(&mut self, pid: Pid, wait_status: WaitStatus) {
        let (status_raw, stopped, completed, terminated) = match wait_status {
            WaitStatus::Exited(_, code) => (Some(encode_exited(code)), false, true, false),
            WaitStatus::Signaled(_, sig, _) => (Some(encode_signaled(sig as i32)), false, true, true),
            WaitStatus::Stopped(_, _) => (None, true, false, false),
            WaitStatus::Continued(_) => (None, false, false, false),
            _ => return,
        };

        if let Some(process) = self.find_process_mut(pid) {
            if let Some(raw) = status_raw {
                process.status = Some(raw);
            }
            process.stopped = stopped;
            process.completed = completed;
            if terminated {
                eprintln!("{pid}: terminated by signal");
            }
        }
    }

    /// Non-blocking sweep of every reapable child (the reaping half of
    /// §4.6); called between commands from the main REPL loop.
    pub fn reap_all(&mut self) {
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WUNTRACED | WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) | Err(_) => break,
                Ok(status) => {
                    if let Some(pid) = status.pid() {
                        self.update_process_status(pid, status);
                    } else {
                        break;
                    }
                }
            }
        }
    }

    /// Blocks until every process in `id`'s pgid has completed or stopped
    /// (the C original's `wait_for_job`).
    fn wait_for_job(&mut self, id: usize) {
        loop {
            let pgid = match self.job(id) {
                Some(job) => match job.pgid {
                    Some(pgid) => pgid,
                    None => return,
                },
                None => return,
            };

            match waitpid(Pid::from_raw(-pgid.as_raw()), Some(WaitPidFlag::WUNTRACED)) {
                Ok(status) => {
                    if let Some(pid) = status.pid() {
                        self.update_process_status(pid, status);
                    }
                }
                Err(nix::Error::ECHILD) => return,
                Err(nix::Error::EINTR) => continue,
                Err(_) => return,
            }

            match self.job(id) {
                Some(job) if job.is_stopped() || job.is_completed() => return,
                Some(_) => continue,
                None => return,
            }
        }
    }

    /// Performs §4.6's "foreground launch" terminal handoff and wait, then
    /// reclaims the terminal and records the job's terminal modes. Returns
    /// the exit status to leave in `$?` (the rightmost process's code, or 0
    /// for a job that never got a process or is still stopped).
    pub fn put_job_in_foreground(&mut self, id: usize, send_cont: bool) -> ShellResult<i32> {
        let pgid = self.job(id).and_then(|j| j.pgid);
        let Some(pgid) = pgid else {
            return Ok(0);
        };
        let fd = unsafe { BorrowedFd::borrow_raw(self.shell_terminal) };

        if self.is_interactive {
            unistd::tcsetpgrp(fd, pgid)?;
        }

        if send_cont {
            if let Some(tmodes) = self.job(id).and_then(|j| j.saved_tmodes.clone()) {
                if self.is_interactive {
                    termios::tcsetattr(fd, termios::SetArg::TCSADRAIN, &tmodes)?;
                }
            }
            signal::kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGCONT)?;
            if let Some(job) = self.job_mut(id) {
                job.state = JobState::Running;
            }
        }

        self.wait_for_job(id);

        if self.is_interactive {
            unistd::tcsetpgrp(fd, self.shell_pgid)?;
            if let Ok(tmodes) = termios::tcgetattr(fd) {
                if let Some(job) = self.job_mut(id) {
                    job.saved_tmodes = Some(tmodes);
                }
            }
            if let Some(shell_tmodes) = &self.shell_tmodes {
                termios::tcsetattr(fd, termios::SetArg::TCSADRAIN, shell_tmodes)?;
            }
        }

        let status = self.job(id).map(Job::last_exit_code).unwrap_or(0);

        if let Some(job) = self.job(id) {
            if job.is_completed() {
                self.remove(id);
            } else if job.is_stopped() {
                if let Some(job) = self.job_mut(id) {
                    job.state = JobState::Stopped;
                    job.notified = true;
                }
                eprintln!("{}", self.job(id).unwrap());
            }
        }

        Ok(status)
    }

    /// Performs §4.6's "background" handoff: optionally resumes a stopped
    /// job with SIGCONT and prints its one-line status without waiting.
    pub fn put_job_in_background(&mut self, id: usize, send_cont: bool) -> ShellResult<()> {
        let pgid = self.job(id).and_then(|j| j.pgid);
        if let Some(pgid) = pgid {
            if send_cont {
                signal::kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGCONT)?;
                if let Some(job) = self.job_mut(id) {
                    job.state = JobState::Running;
                }
            }
        }
        if let Some(job) = self.job_mut(id) {
            job.foreground = false;
        }
        if let Some(job) = self.job(id) {
            println!("[{}] {}", job.id, job.pgid.map(|p| p.as_raw()).unwrap_or(0));
        }
        Ok(())
    }

    /// Between-commands sweep: notify the user about any job that newly
    /// became DONE or STOPPED, then free DONE+notified jobs (§4.6).
    pub fn notify_changed(&mut self) {
        self.reap_all();
        let mut to_remove = Vec::new();
        for job in self.slots.iter_mut().filter_map(Option::as_mut) {
            if job.is_completed() {
                if !job.notified {
                    println!("[{}]+  Done\t\t{}", job.id, job.command);
                    job.state = JobState::Done;
                    job.notified = true;
                }
                to_remove.push(job.id);
            } else if job.is_stopped() && job.state != JobState::Stopped {
                println!("[{}]+  Stopped\t\t{}", job.id, job.command);
                job.state = JobState::Stopped;
                job.notified = true;
            }
        }
        for id in to_remove {
            self.remove(id);
        }
    }
}

/// Raw file descriptor for whichever stream is the controlling terminal.
pub fn terminal_fd() -> RawFd {
    std::io::stdin().as_raw_fd()
}

fn encode_exited(code: i32) -> i32 {
    (code & 0xff) << 8
}

fn encode_signaled(sig: i32) -> i32 {
    sig & 0x7f
}

fn is_wifexited(status: i32) -> bool {
    (status & 0x7f) == 0
}

fn wexitstatus(status: i32) -> i32 {
    (status >> 8) & 0xff
}

fn is_wifsignaled(status: i32) -> bool {
    ((status & 0x7f) + 1) as i8 >> 1 > 0
}

fn wtermsig(status: i32) -> i32 {
    status & 0x7f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_predicates() {
        let mut job = Job::new(1, "sleep 1".into(), true);
        job.processes.push(Process::new(Pid::from_raw(1)));
        job.processes.push(Process::new(Pid::from_raw(2)));
        assert!(!job.is_completed());
        assert!(!job.is_stopped());

        job.processes[0].completed = true;
        job.processes[0].status = Some(encode_exited(0));
        job.processes[1].completed = true;
        job.processes[1].status = Some(encode_exited(3));
        assert!(job.is_completed());
        assert_eq!(job.last_exit_code(), 3);
    }

    #[test]
    fn stopped_requires_no_running_member() {
        let mut job = Job::new(1, "cmd".into(), true);
        job.processes.push(Process::new(Pid::from_raw(1)));
        job.processes[0].stopped = true;
        assert!(job.is_stopped());

        job.processes.push(Process::new(Pid::from_raw(2)));
        assert!(!job.is_stopped());
    }

    #[test]
    fn job_table_allocates_dense_ids() {
        let mut table = JobTable {
            slots: (0..MAX_JOBS).map(|_| None).collect(),
            shell_pgid: Pid::from_raw(1),
            shell_terminal: 0,
            is_interactive: false,
            shell_tmodes: None,
        };
        let a = table.create_job("a".into(), false).unwrap();
        let b = table.create_job("b".into(), false).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert!(table.disown(a));
        let c = table.create_job("c".into(), false).unwrap();
        assert_eq!(c, 1, "disown leaves a hole that is reused, not compacted away");
    }
}
