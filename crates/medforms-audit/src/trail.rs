use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AuditError;
use crate::events::AuditEvent;

/// Append-only JSON-lines file of audit events.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    path: PathBuf,
}

impl AuditTrail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Emit `event` and append it to the trail.
    pub fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        event.emit();

        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Every event recorded so far, oldest first. Lines that do not parse
    /// are skipped.
    pub fn read_all(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut events = Vec::new();
        for (line_no, line) in raw.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line = line_no + 1, error = %e, "skipping unreadable audit line");
                }
            }
        }
        Ok(events)
    }
}
