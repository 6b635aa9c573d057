use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use medforms_audit::{AuditEvent, AuditTrail};
use medforms_engine::FillSession;
use medforms_storage::{FileStore, FormRepository, MemoryStore};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;

/// Submitted sessions kept open for printing and export before the oldest
/// is evicted.
pub const RETAINED_SUBMISSIONS: usize = 32;

/// Everything the commands share: saved forms, open fill sessions, the audit
/// trail and the role of whoever is driving the UI.
pub struct AppState {
    pub repository: FormRepository,
    pub role: String,
    audit: Option<AuditTrail>,
    sessions: Mutex<HashMap<Uuid, FillSession>>,
    submitted: Mutex<VecDeque<Uuid>>,
    retained_submissions: usize,
}

impl AppState {
    /// State backed by files under the configured data directory.
    pub fn open(config: &AppConfig, role: impl Into<String>) -> Self {
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_parts(
            FormRepository::new(store),
            Some(AuditTrail::new(config.audit_path())),
            role,
        )
    }

    /// State that keeps nothing beyond the process. Audit events are still
    /// emitted through `tracing`.
    pub fn in_memory(role: impl Into<String>) -> Self {
        Self::with_parts(FormRepository::new(Arc::new(MemoryStore::new())), None, role)
    }

    pub fn with_parts(
        repository: FormRepository,
        audit: Option<AuditTrail>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            role: role.into(),
            audit,
            sessions: Mutex::new(HashMap::new()),
            submitted: Mutex::new(VecDeque::new()),
            retained_submissions: RETAINED_SUBMISSIONS,
        }
    }

    /// Keep at most `limit` submitted sessions around.
    pub fn with_retained_submissions(mut self, limit: usize) -> Self {
        self.retained_submissions = limit;
        self
    }

    pub fn audit_trail(&self) -> Option<&AuditTrail> {
        self.audit.as_ref()
    }

    pub(crate) fn record(&self, event: AuditEvent) -> Result<(), AppError> {
        match &self.audit {
            Some(trail) => trail.record(&event)?,
            None => event.emit(),
        }
        Ok(())
    }

    pub(crate) fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, FillSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Note that `id` was submitted and evict the oldest submitted sessions
    /// beyond the retention limit.
    pub(crate) fn mark_submitted(&self, id: Uuid) {
        let mut submitted = self.submitted.lock().unwrap_or_else(PoisonError::into_inner);
        submitted.retain(|s| *s != id);
        submitted.push_back(id);

        let mut sessions = self.sessions();
        while submitted.len() > self.retained_submissions {
            let Some(evicted) = submitted.pop_front() else {
                break;
            };
            sessions.remove(&evicted);
            tracing::debug!(session_id = %evicted, "evicted submitted fill session");
        }
    }

    pub(crate) fn forget_session(&self, id: Uuid) -> Option<FillSession> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| *s != id);
        self.sessions().remove(&id)
    }

    /// Run `f` against the open session `id`.
    pub(crate) fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut FillSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("no open fill session {id}")))?;
        f(session)
    }
}
