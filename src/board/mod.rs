//! In-memory mirror of the signed-in user's jobs.
//!
//! Every mutation is confirm-then-apply: the server is asked first and
//! local state changes only on success, so the collection is never ahead
//! of the last acknowledged server state. A per-job in-flight guard
//! serializes mutations per entity, and a generation counter lets a full
//! reload dominate any mutation that was already in the air when the
//! reload finished.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::models::{Job, JobPatch, JobStatus};
use crate::session::SessionState;

/// Per-status totals in fixed enumeration order (TODO, IN PROGRESS, DONE).
/// Always carries all three statuses, even at zero; the sum equals the
/// collection size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }
}

/// Transient edit buffer for one job's title and description. Discarded on
/// cancel, committed only after the server accepts the update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
}

#[derive(Default)]
struct BoardState {
    jobs: Vec<Job>,
    in_flight: HashSet<u64>,
    editing: Option<(u64, JobDraft)>,
    notice: Option<String>,
    generation: u64,
}

pub struct JobBoard {
    api: Arc<ApiClient>,
    state: Mutex<BoardState>,
}

impl JobBoard {
    pub fn new(api: Arc<ApiClient>) -> Arc<Self> {
        Arc::new(Self {
            api,
            state: Mutex::new(BoardState::default()),
        })
    }

    // ── Views ─────────────────────────────────────────────────

    /// Snapshot of the collection, newest first.
    pub fn jobs(&self) -> Vec<Job> {
        self.lock().jobs.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().jobs.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<Job> {
        self.lock().jobs.iter().find(|j| j.id == id).cloned()
    }

    /// Last user-visible confirmation or error message.
    pub fn notice(&self) -> Option<String> {
        self.lock().notice.clone()
    }

    /// Derive per-status counts on demand.
    pub fn status_counts(&self) -> StatusCounts {
        let state = self.lock();
        let mut counts = StatusCounts {
            todo: 0,
            in_progress: 0,
            done: 0,
        };
        for job in &state.jobs {
            match job.status {
                JobStatus::Todo => counts.todo += 1,
                JobStatus::InProgress => counts.in_progress += 1,
                JobStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    // ── Operations ────────────────────────────────────────────

    /// Fetch the full list and replace the collection wholesale. The view
    /// never shows a mix of two fetches, and mutations that were already in
    /// flight when the reload finished cannot rewrite the fresh collection.
    pub async fn load(&self) -> Result<usize, ApiError> {
        let jobs = match self.api.list_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                self.report_failure("Could not load tasks", &e);
                return Err(e);
            }
        };

        let mut state = self.lock();
        state.generation += 1;
        let count = jobs.len();
        state.jobs = jobs;
        debug!(count, "job collection replaced");
        Ok(count)
    }

    /// Create a job. The server assigns the identifier, so there is no
    /// optimistic insertion: the job becomes addressable only on success,
    /// at the front of the collection (newest first).
    pub async fn create(&self, title: &str, description: &str) -> Result<Job, ApiError> {
        if title.trim().is_empty() {
            let e = ApiError::Validation("title must not be empty".into());
            self.lock().notice = Some("Error adding task: title must not be empty".into());
            return Err(e);
        }

        let description = (!description.is_empty()).then_some(description);
        let generation = self.lock().generation;
        match self.api.create_job(title, description).await {
            Ok(job) => {
                let mut state = self.lock();
                // A sign-out or reload while the create was in flight owns
                // the collection now; a concurrent load may also already
                // have fetched the new job.
                if state.generation == generation {
                    if !state.jobs.iter().any(|j| j.id == job.id) {
                        state.jobs.insert(0, job.clone());
                    }
                    state.notice = Some("Task added!".into());
                }
                info!(id = job.id, "task created");
                Ok(job)
            }
            Err(e) => {
                self.report_failure("Error adding task", &e);
                Err(e)
            }
        }
    }

    /// Route a status change through the server, then reflect it locally by
    /// identifier match. A job that disappeared between dispatch and
    /// response is a no-op; a no-op transition leaves the collection
    /// observably unchanged.
    pub async fn set_status(&self, id: u64, status: JobStatus) -> Result<(), ApiError> {
        let generation = self.begin_mutation(id)?;
        let result = self.api.update_job_status(id, status).await;
        self.end_mutation(id);

        match result {
            Ok(confirmed) => {
                let mut state = self.lock();
                if state.generation == generation {
                    if let Some(job) = state.jobs.iter_mut().find(|j| j.id == id) {
                        job.status = confirmed.status;
                        if confirmed.updated_at.is_some() {
                            job.updated_at = confirmed.updated_at;
                        }
                    }
                    state.notice = Some(format!("Task moved to {}", confirmed.status));
                }
                Ok(())
            }
            Err(e) => {
                self.report_failure("Error updating status", &e);
                Err(e)
            }
        }
    }

    /// Begin editing: seed a draft from the current job. Returns `None` if
    /// the job is not in the collection.
    pub fn begin_edit(&self, id: u64) -> Option<JobDraft> {
        let mut state = self.lock();
        let job = state.jobs.iter().find(|j| j.id == id)?;
        let draft = JobDraft {
            title: job.title.clone(),
            description: job.description.clone().unwrap_or_default(),
        };
        state.editing = Some((id, draft.clone()));
        Some(draft)
    }

    /// Discard the active draft without contacting the server.
    pub fn cancel_edit(&self) {
        self.lock().editing = None;
    }

    pub fn edit_draft(&self) -> Option<(u64, JobDraft)> {
        self.lock().editing.clone()
    }

    /// Commit a draft. Only the fields the server echoes back are merged
    /// into the local job; the active edit session is cleared on success.
    pub async fn edit(&self, id: u64, draft: JobDraft) -> Result<(), ApiError> {
        if draft.title.trim().is_empty() {
            let e = ApiError::Validation("title must not be empty".into());
            self.lock().notice = Some("Error updating task: title must not be empty".into());
            return Err(e);
        }

        let generation = self.begin_mutation(id)?;
        let patch = JobPatch {
            title: Some(draft.title.clone()),
            description: Some(draft.description.clone()),
            status: None,
        };
        let result = self.api.update_job(id, &patch).await;
        self.end_mutation(id);

        match result {
            Ok(confirmed) => {
                let mut state = self.lock();
                if state.generation == generation {
                    if let Some(job) = state.jobs.iter_mut().find(|j| j.id == id) {
                        merge_echoed(job, confirmed);
                    }
                    state.notice = Some("Task updated!".into());
                }
                if state
                    .editing
                    .as_ref()
                    .is_some_and(|(editing, _)| *editing == id)
                {
                    state.editing = None;
                }
                Ok(())
            }
            Err(e) => {
                self.report_failure("Error updating task", &e);
                Err(e)
            }
        }
    }

    /// Delete a job on the server, then drop it locally by identifier. The
    /// caller must have collected user confirmation before invoking this;
    /// the board only talks to the server.
    pub async fn remove(&self, id: u64) -> Result<(), ApiError> {
        self.begin_mutation(id)?;
        let result = self.api.delete_job(id).await;
        self.end_mutation(id);

        match result {
            Ok(()) => {
                let mut state = self.lock();
                state.jobs.retain(|j| j.id != id);
                state.notice = Some("Task deleted".into());
                info!(id, "task deleted");
                Ok(())
            }
            Err(e) => {
                self.report_failure("Error deleting task", &e);
                Err(e)
            }
        }
    }

    // ── Session coupling ──────────────────────────────────────

    /// Flush the collection whenever the session signs out so one user's
    /// jobs never leak into the next session. Runs until the session store
    /// is dropped.
    pub fn spawn_session_watch(
        self: &Arc<Self>,
        mut rx: watch::Receiver<SessionState>,
    ) -> tokio::task::JoinHandle<()> {
        let board = Arc::clone(self);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if matches!(*rx.borrow_and_update(), SessionState::SignedOut) {
                    board.clear();
                    debug!("session signed out, job collection flushed");
                }
            }
        })
    }

    /// Drop all local state. Also bumps the generation so responses of
    /// mutations still in flight for the old session are discarded.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.jobs.clear();
        state.editing = None;
        state.notice = None;
    }

    // ── Internals ─────────────────────────────────────────────

    /// Register a mutation against `id`. Rejects the call if another
    /// mutation for the same job is still awaiting its response; returns
    /// the collection generation the response must match to be applied.
    fn begin_mutation(&self, id: u64) -> Result<u64, ApiError> {
        let mut state = self.lock();
        if !state.in_flight.insert(id) {
            state.notice = Some(format!("Task {id} is still being updated"));
            return Err(ApiError::Validation(format!(
                "task {id} already has an update in flight"
            )));
        }
        Ok(state.generation)
    }

    fn end_mutation(&self, id: u64) {
        self.lock().in_flight.remove(&id);
    }

    fn report_failure(&self, prefix: &str, error: &ApiError) {
        warn!(error = %error, "{}", prefix);
        // Session loss is reported globally by the shell; everything else
        // becomes a user-visible message here.
        if !matches!(error, ApiError::SessionExpired) {
            self.lock().notice = Some(format!("{prefix}: {error}"));
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Merge only what the server echoed; locally known fields it stayed
/// silent on are preserved.
fn merge_echoed(local: &mut Job, echoed: Job) {
    local.title = echoed.title;
    if echoed.description.is_some() {
        local.description = echoed.description;
    }
    local.status = echoed.status;
    if echoed.created_at.is_some() {
        local.created_at = echoed.created_at;
    }
    if echoed.updated_at.is_some() {
        local.updated_at = echoed.updated_at;
    }
}
