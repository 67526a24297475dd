//! The orchestrator core: a priority queue worker, a scheduler loop, and a
//! status monitor, each a `tokio::spawn`ed task sharing one [`OrchestratorHandle`].
//!
//! Grounded on `MultiAgentOrchestrator`'s worker/scheduler/monitor loop shape
//! in the teacher's `rustant-core/src/multi/orchestrator.rs`, and on
//! `_process_task`/`_handle_task_completion`/`_task_worker`/`_scheduler_worker`
//! /`_monitor_worker` in `original_source/orchestrator.py`.

use crate::event_bus::EventBus;
use crate::multi::completion::derive_events;
use crate::queue::PriorityTaskQueue;
use crate::scheduler::Scheduler;
use chrono::Utc;
use miq_core::agent::AgentRuntime;
use miq_core::config::Settings;
use miq_core::error::OrchestratorError;
use miq_core::memory::{AgentMemoryJournal, InterAgentEventLog, TaskHistoryLog};
use miq_core::types::{AgentKey, Event, Priority, Task, TaskInput, TaskStatus, TriggeredBy};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Default, Clone, Copy)]
pub struct OrchestratorStats {
    pub tasks_processed: u64,
    pub tasks_failed: u64,
    pub events_emitted: u64,
    pub workflows_completed: u64,
}

#[derive(Debug, Clone)]
struct WorkflowState {
    id: String,
    remaining: VecDeque<AgentKey>,
    priority: Priority,
    input: TaskInput,
}

struct OrchestratorInner {
    queue: Mutex<PriorityTaskQueue>,
    tasks: Mutex<HashMap<String, Task>>,
    agents: HashMap<AgentKey, Arc<AgentRuntime>>,
    settings: Arc<Settings>,
    event_bus: EventBus,
    event_log: InterAgentEventLog,
    task_history: TaskHistoryLog,
    stats: Mutex<OrchestratorStats>,
    workflows: Mutex<HashMap<String, WorkflowState>>,
    task_workflow: Mutex<HashMap<String, String>>,
}

/// A cheaply cloneable reference to the orchestrator's shared state. All
/// public operations (`submit_task`, `cancel_task`, `emit_event`, ...) go
/// through this handle so both the caller and the spawned worker loops see
/// the same queue.
#[derive(Clone)]
pub struct OrchestratorHandle(Arc<OrchestratorInner>);

impl OrchestratorHandle {
    pub fn new(agents: HashMap<AgentKey, Arc<AgentRuntime>>, settings: Arc<Settings>) -> Self {
        let event_log = InterAgentEventLog::new(settings.memory_root.as_str());
        let task_history = TaskHistoryLog::new(settings.memory_root.as_str());
        Self(Arc::new(OrchestratorInner {
            queue: Mutex::new(PriorityTaskQueue::new()),
            tasks: Mutex::new(HashMap::new()),
            agents,
            settings,
            event_bus: EventBus::new(),
            event_log,
            task_history,
            stats: Mutex::new(OrchestratorStats::default()),
            workflows: Mutex::new(HashMap::new()),
            task_workflow: Mutex::new(HashMap::new()),
        }))
    }

    fn journal_for(&self, agent_key: &AgentKey) -> AgentMemoryJournal {
        AgentMemoryJournal::new(
            self.0.settings.memory_root.as_str(),
            agent_key.clone(),
            self.0.settings.memory_max_entries_per_agent,
            self.0.settings.memory_trim_to,
        )
    }

    /// Count the `task:`-hop depth of `task`'s `triggered_by` chain by
    /// walking already-recorded tasks. Caller holds no lock; this acquires
    /// `tasks` briefly.
    async fn hop_depth(&self, task: &Task) -> u8 {
        let tasks = self.0.tasks.lock().await;
        let mut depth = 0u8;
        let mut current = task.parent_task_id().map(str::to_string);
        while let Some(parent_id) = current {
            depth += 1;
            current = tasks.get(&parent_id).and_then(|t| t.parent_task_id().map(str::to_string));
            if depth > 64 {
                break; // defensive: a malformed chain should never reach this
            }
        }
        depth
    }

    /// Validate hop depth, record the task, and enqueue it.
    pub async fn submit_task(&self, task: Task) -> Result<String, OrchestratorError> {
        if !self.0.agents.contains_key(&task.agent_key) {
            return Err(OrchestratorError::UnknownAgent { key: task.agent_key.to_string() });
        }

        let depth = self.hop_depth(&task).await;
        if depth >= self.0.settings.max_event_chain_hops {
            let root = task.parent_task_id().unwrap_or(&task.id).to_string();
            return Err(OrchestratorError::HopLimitExceeded { root, max: self.0.settings.max_event_chain_hops });
        }

        let id = task.id.clone();
        self.0.tasks.lock().await.insert(id.clone(), task.clone());
        self.0.queue.lock().await.push(task);
        tracing::debug!(task_id = %id, "task submitted");
        Ok(id)
    }

    /// Cancel a still-pending task. Returns `true` if it was pending and is
    /// now cancelled, `false` if it was unknown or already terminal (a
    /// no-op, not an error) — a running or completed task cannot be
    /// un-dispatched.
    pub async fn cancel_task(&self, task_id: &str) -> bool {
        match self.0.queue.lock().await.cancel(task_id) {
            Ok(cancelled) => {
                self.0.tasks.lock().await.insert(task_id.to_string(), cancelled);
                true
            }
            Err(_) => false,
        }
    }

    pub async fn task_status(&self, task_id: &str) -> Option<Task> {
        self.0.tasks.lock().await.get(task_id).cloned()
    }

    pub async fn stats(&self) -> OrchestratorStats {
        *self.0.stats.lock().await
    }

    pub async fn pending_count(&self) -> usize {
        self.0.queue.lock().await.len()
    }

    /// Publish an event, submitting one task per subscriber at the event's
    /// dispatch priority (`High` for compliance/breaking-news/violation,
    /// `Normal` otherwise). Returns the ids of the tasks created.
    pub async fn emit_event(&self, event: Event) -> Result<Vec<String>, OrchestratorError> {
        let subscribers = self.0.event_bus.resolve(&event);
        let priority = event.kind.dispatch_priority();
        let mut created = Vec::new();
        for agent_key in subscribers {
            if !self.0.agents.contains_key(agent_key) {
                continue;
            }
            let task = Task::new(agent_key.clone(), TaskInput::Structured(Default::default()), priority)
                .with_triggered_by(TriggeredBy::Event(event.kind.to_string()));
            match self.submit_task(task).await {
                Ok(id) => created.push(id),
                Err(err) => tracing::warn!(%err, agent = %agent_key, "failed to submit event-derived task"),
            }
        }

        {
            let mut stats = self.0.stats.lock().await;
            stats.events_emitted += 1;
        }
        if let Err(err) = self.0.event_log.append(&event, &created) {
            tracing::warn!(%err, "failed to append inter-agent event log");
        }
        Ok(created)
    }

    /// Submit the first step of a sequential multi-agent workflow. Later
    /// steps are submitted automatically as each prior step completes.
    pub async fn submit_workflow(
        &self,
        agent_keys: Vec<AgentKey>,
        input: TaskInput,
        priority: Priority,
    ) -> Result<String, OrchestratorError> {
        let mut agent_keys = VecDeque::from(agent_keys);
        let Some(first) = agent_keys.pop_front() else {
            return Err(OrchestratorError::EmptyWorkflow { id: miq_core::types::short_id() });
        };

        let workflow_id = miq_core::types::short_id();
        let task = Task::new(first, input.clone(), priority);
        let task_id = self.submit_task(task).await?;

        self.0.workflows.lock().await.insert(
            workflow_id.clone(),
            WorkflowState { id: workflow_id.clone(), remaining: agent_keys, priority, input },
        );
        self.0.task_workflow.lock().await.insert(task_id.clone(), workflow_id);
        Ok(task_id)
    }

    /// Advance a workflow after `completed_task_id` finishes, submitting the
    /// next step if any remain.
    async fn advance_workflow(&self, completed_task_id: &str) {
        let workflow_id = {
            let mut map = self.0.task_workflow.lock().await;
            match map.remove(completed_task_id) {
                Some(id) => id,
                None => return,
            }
        };

        let mut workflows = self.0.workflows.lock().await;
        let mut state = match workflows.remove(&workflow_id) {
            Some(state) => state,
            None => return,
        };
        drop(workflows);

        let Some(next_key) = state.remaining.pop_front() else {
            let mut stats = self.0.stats.lock().await;
            stats.workflows_completed += 1;
            return;
        };

        let task = Task::new(next_key, state.input.clone(), state.priority)
            .with_triggered_by(TriggeredBy::Task(completed_task_id.to_string()));
        let priority = state.priority;
        let input = state.input.clone();
        let remaining = state.remaining.clone();

        match self.submit_task(task).await {
            Ok(next_task_id) => {
                self.0.workflows.lock().await.insert(
                    workflow_id.clone(),
                    WorkflowState { id: workflow_id.clone(), remaining, priority, input },
                );
                self.0.task_workflow.lock().await.insert(next_task_id, workflow_id);
            }
            Err(err) => tracing::warn!(%err, workflow_id, "failed to advance workflow"),
        }
    }

    /// Pop and run one task, if any is queued. Returns `true` if a task was
    /// processed (used by the worker loop to decide whether to sleep).
    async fn process_one(&self) -> bool {
        let mut task = match self.0.queue.lock().await.pop() {
            Some(task) => task,
            None => return false,
        };

        task.status = TaskStatus::Running;
        task.started_at = Some(Utc::now());
        self.0.tasks.lock().await.insert(task.id.clone(), task.clone());

        let Some(runtime) = self.0.agents.get(&task.agent_key) else {
            tracing::error!(agent = %task.agent_key, "agent vanished after submission");
            return true;
        };

        let envelope = runtime.run(&task.input).await;
        task.status = if envelope.success { TaskStatus::Completed } else { TaskStatus::Failed };
        task.completed_at = Some(Utc::now());
        task.result = Some(envelope.clone());
        self.0.tasks.lock().await.insert(task.id.clone(), task.clone());

        {
            let mut stats = self.0.stats.lock().await;
            stats.tasks_processed += 1;
            if !envelope.success {
                stats.tasks_failed += 1;
            }
        }

        let journal = self.journal_for(&task.agent_key);
        if let Err(err) = journal.save_task(&task, &envelope) {
            tracing::warn!(%err, "failed to write agent memory journal");
        }
        if let Err(err) = self.0.task_history.append(&task, &envelope) {
            tracing::warn!(%err, "failed to append task history log");
        }

        for event in derive_events(&task, &envelope) {
            if let Err(err) = self.emit_event(event).await {
                tracing::warn!(%err, "failed to emit derived event");
            }
        }

        self.advance_workflow(&task.id).await;

        true
    }
}

/// Owns the three spawned background loops: task worker, scheduler, monitor.
pub struct Orchestrator {
    handle: OrchestratorHandle,
    scheduler: Arc<Mutex<Scheduler>>,
    join_handles: Vec<JoinHandle<()>>,
}

impl Orchestrator {
    pub fn new(agents: HashMap<AgentKey, Arc<AgentRuntime>>, settings: Arc<Settings>) -> Self {
        Self {
            handle: OrchestratorHandle::new(agents, settings),
            scheduler: Arc::new(Mutex::new(Scheduler::new())),
            join_handles: Vec::new(),
        }
    }

    pub fn handle(&self) -> OrchestratorHandle {
        self.handle.clone()
    }

    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    /// Spawn the task worker, scheduler loop, and status monitor. Each keeps
    /// running until the orchestrator is dropped.
    pub fn run(&mut self) {
        let worker_handle = self.handle.clone();
        self.join_handles.push(tokio::spawn(async move {
            loop {
                if !worker_handle.process_one().await {
                    tokio::time::sleep(StdDuration::from_millis(50)).await;
                }
            }
        }));

        let scheduler_handle = self.handle.clone();
        let scheduler = Arc::clone(&self.scheduler);
        self.join_handles.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(StdDuration::from_secs(1));
            loop {
                interval.tick().await;
                let due = scheduler.lock().await.due_jobs(Utc::now());
                for job in due {
                    let task = Task::new(job.agent_key.clone(), job.input.clone(), Priority::Normal)
                        .with_triggered_by(TriggeredBy::Schedule(job.id.clone()));
                    if let Err(err) = scheduler_handle.submit_task(task).await {
                        tracing::warn!(%err, job_id = %job.id, "scheduled job failed to submit");
                    }
                }
            }
        }));

        let monitor_handle = self.handle.clone();
        self.join_handles.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(StdDuration::from_secs(60));
            loop {
                interval.tick().await;
                let stats = monitor_handle.stats().await;
                let pending = monitor_handle.pending_count().await;
                tracing::info!(
                    pending,
                    processed = stats.tasks_processed,
                    failed = stats.tasks_failed,
                    events = stats.events_emitted,
                    "orchestrator status"
                );
            }
        }));
    }

    pub fn stop(&mut self) {
        for handle in self.join_handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop();
    }
}
