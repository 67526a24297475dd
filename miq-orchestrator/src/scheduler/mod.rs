//! Recurring-job scheduler: a tick-driven table of [`ScheduledJob`]s that
//! become due task submissions.
//!
//! Grounded on the job table and `setup_default_schedules` in
//! `original_source/orchestrator.py`.

use chrono::{DateTime, Duration, Utc};
use miq_core::error::OrchestratorError;
use miq_core::types::{AgentKey, ScheduledJob, TaskInput};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Scheduler {
    jobs: HashMap<String, ScheduledJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { jobs: HashMap::new() }
    }

    pub fn schedule(&mut self, job: ScheduledJob) {
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn unschedule(&mut self, id: &str) -> Result<ScheduledJob, OrchestratorError> {
        self.jobs
            .remove(id)
            .ok_or_else(|| OrchestratorError::ScheduleNotFound { id: id.to_string() })
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), OrchestratorError> {
        let job = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::ScheduleNotFound { id: id.to_string() })?;
        job.enabled = enabled;
        Ok(())
    }

    pub fn jobs(&self) -> Vec<&ScheduledJob> {
        self.jobs.values().collect()
    }

    /// Advance every enabled job whose `next_run` has passed, returning a
    /// clone of each due job for the caller to turn into a submitted task.
    pub fn due_jobs(&mut self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let mut due = Vec::new();
        for job in self.jobs.values_mut() {
            if job.enabled && job.next_run <= now {
                job.last_run = Some(now);
                job.next_run = now + job.interval;
                job.run_count += 1;
                due.push(job.clone());
            }
        }
        due
    }
}

/// The platform's default recurring schedule, matching
/// `setup_default_schedules` in `original_source/orchestrator.py`.
pub fn default_schedules() -> Vec<ScheduledJob> {
    vec![
        ScheduledJob::new(
            "trending-scan",
            AgentKey::Trending,
            TaskInput::Text("scan".into()),
            Duration::minutes(5),
        ),
        ScheduledJob::new(
            "compliance-sweep",
            AgentKey::Compliance,
            TaskInput::Text("sweep".into()),
            Duration::minutes(10),
        ),
        ScheduledJob::new(
            "rights-expiry-check",
            AgentKey::Rights,
            TaskInput::Text("check".into()),
            Duration::hours(1),
        ),
        ScheduledJob::new(
            "archive-optimize",
            AgentKey::Archive,
            TaskInput::Text("optimize".into()),
            Duration::hours(6),
        ),
        ScheduledJob::new(
            "deepfake-monitor",
            AgentKey::Deepfake,
            TaskInput::Text("monitor".into()),
            Duration::minutes(2),
        ),
        ScheduledJob::new(
            "fact-check-live",
            AgentKey::FactCheck,
            TaskInput::Text("live".into()),
            Duration::minutes(3),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_jobs_advances_next_run_and_run_count() {
        let mut scheduler = Scheduler::new();
        let job = ScheduledJob::new("j1", AgentKey::Trending, TaskInput::Text("x".into()), Duration::minutes(5));
        let start = job.next_run;
        scheduler.schedule(job);

        let due = scheduler.due_jobs(start + Duration::seconds(1));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].run_count, 1);

        let due_again = scheduler.due_jobs(start + Duration::seconds(2));
        assert!(due_again.is_empty());
    }

    #[test]
    fn disabled_job_never_becomes_due() {
        let mut scheduler = Scheduler::new();
        let mut job = ScheduledJob::new("j1", AgentKey::Trending, TaskInput::Text("x".into()), Duration::minutes(5));
        job.enabled = false;
        let start = job.next_run;
        scheduler.schedule(job);

        assert!(scheduler.due_jobs(start + Duration::hours(1)).is_empty());
    }

    #[test]
    fn unschedule_removes_job() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ScheduledJob::new("j1", AgentKey::Trending, TaskInput::Text("x".into()), Duration::minutes(5)));
        assert!(scheduler.unschedule("j1").is_ok());
        assert!(matches!(
            scheduler.unschedule("j1"),
            Err(OrchestratorError::ScheduleNotFound { .. })
        ));
    }

    #[test]
    fn a_job_ten_intervals_overdue_fires_once_with_no_catch_up() {
        let mut scheduler = Scheduler::new();
        let mut job = ScheduledJob::new("j1", AgentKey::Trending, TaskInput::Text("x".into()), Duration::minutes(5));
        job.next_run = job.next_run - Duration::minutes(50);
        scheduler.schedule(job.clone());

        let due = scheduler.due_jobs(job.next_run + Duration::minutes(50));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].run_count, 1);
    }

    #[test]
    fn pause_then_resume_fires_exactly_the_expected_count() {
        let mut scheduler = Scheduler::new();
        let job = ScheduledJob::new("j1", AgentKey::Trending, TaskInput::Text("x".into()), Duration::seconds(2));
        let start = job.next_run;
        scheduler.schedule(job);

        assert_eq!(scheduler.due_jobs(start + Duration::seconds(1)).len(), 1);
        assert_eq!(scheduler.due_jobs(start + Duration::seconds(3)).len(), 1);
        assert_eq!(scheduler.due_jobs(start + Duration::seconds(5)).len(), 1);

        scheduler.set_enabled("j1", false).unwrap();
        assert!(scheduler.due_jobs(start + Duration::seconds(15)).is_empty());

        scheduler.set_enabled("j1", true).unwrap();
        let due = scheduler.due_jobs(start + Duration::seconds(16));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].run_count, 4);
    }

    #[test]
    fn default_schedules_cover_the_expected_agents() {
        let jobs = default_schedules();
        assert_eq!(jobs.len(), 6);
        assert!(jobs.iter().any(|j| j.agent_key == AgentKey::Trending));
        assert!(jobs.iter().any(|j| j.agent_key == AgentKey::Deepfake));
    }
}
