//! Commands invoked by the builder and filler front-ends.

use medforms_audit::{AuditAction, AuditEvent};
use medforms_core::{Field, FieldKey, Form, FormSummary};
use medforms_engine::{AnswerSet, AnswerValue, ErrorMap, FillSession, SessionState};
use medforms_export::SubmissionExport;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// What the filler renders after every interaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillView {
    pub session_id: Uuid,
    pub form: Form,
    pub state: SessionState,
    pub answers: AnswerSet,
    pub errors: ErrorMap,
}

impl FillView {
    fn of(session_id: Uuid, session: &FillSession) -> Self {
        Self {
            session_id,
            form: session.form().clone(),
            state: session.state(),
            answers: session.answers().clone(),
            errors: session.errors().clone(),
        }
    }
}

fn parse_key(raw: &str) -> Result<FieldKey, AppError> {
    raw.parse::<FieldKey>()
        .map_err(|e| AppError::bad_request(e.to_string()))
}

pub fn list_forms(state: &AppState) -> Result<Vec<FormSummary>, AppError> {
    Ok(state.repository.summaries()?)
}

pub fn get_form(state: &AppState, id: Uuid) -> Result<Form, AppError> {
    Ok(state.repository.get(id)?)
}

pub fn save_form(state: &AppState, form: Form) -> Result<Form, AppError> {
    let saved = state.repository.save(form)?;
    let id = saved.id.map(|id| id.to_string()).unwrap_or_default();
    state.record(
        AuditEvent::new(AuditAction::FormSaved, "form", id, &state.role).with_details(
            serde_json::json!({
                "title": saved.title,
                "fieldCount": saved.total_field_count(),
            }),
        ),
    )?;
    Ok(saved)
}

pub fn delete_form(state: &AppState, id: Uuid) -> Result<(), AppError> {
    state.repository.delete(id)?;
    state.record(AuditEvent::new(
        AuditAction::FormDeleted,
        "form",
        id.to_string(),
        &state.role,
    ))?;
    Ok(())
}

/// Mark a saved form as the one the builder should open.
pub fn edit_form(state: &AppState, id: Uuid) -> Result<(), AppError> {
    state.repository.begin_edit(id)?;
    state.record(AuditEvent::new(
        AuditAction::EditStarted,
        "form",
        id.to_string(),
        &state.role,
    ))?;
    Ok(())
}

/// The form the builder should open, or `None` to start a new one.
pub fn form_to_edit(state: &AppState) -> Result<Option<Form>, AppError> {
    Ok(state.repository.load_for_edit()?)
}

pub fn finish_editing(state: &AppState) -> Result<(), AppError> {
    Ok(state.repository.clear_edit()?)
}

/// Open a fill session on a saved form. A form that no longer exists is a
/// terminal `NotFound`.
pub fn open_fill_session(state: &AppState, form_id: Uuid) -> Result<FillView, AppError> {
    let form = state.repository.get(form_id)?;
    let session = FillSession::open(form);
    let session_id = Uuid::new_v4();
    let view = FillView::of(session_id, &session);
    state.sessions().insert(session_id, session);

    tracing::debug!(%session_id, %form_id, "fill session opened");
    Ok(view)
}

pub fn set_answer(
    state: &AppState,
    session_id: Uuid,
    key: &str,
    value: AnswerValue,
) -> Result<FillView, AppError> {
    let key = parse_key(key)?;
    state.with_session(session_id, |session| {
        session.set_answer(key, value)?;
        Ok(FillView::of(session_id, session))
    })
}

pub fn clear_answer(state: &AppState, session_id: Uuid, key: &str) -> Result<FillView, AppError> {
    let key = parse_key(key)?;
    state.with_session(session_id, |session| {
        session.clear_answer(&key)?;
        Ok(FillView::of(session_id, session))
    })
}

/// Nested fields to render under the field answering at `key`.
pub fn visible_nested_fields(
    state: &AppState,
    session_id: Uuid,
    key: &str,
) -> Result<Vec<Field>, AppError> {
    let key = parse_key(key)?;
    state.with_session(session_id, |session| {
        Ok(session
            .visible_nested_fields(&key)
            .into_iter()
            .cloned()
            .collect())
    })
}

/// Validate and submit. Failures come back as [`AppError::Invalid`] with
/// one entry per offending key and leave the session open for correction.
/// A submitted session stays readable until it is closed or evicted by
/// newer submissions.
pub fn submit(state: &AppState, session_id: Uuid) -> Result<SubmissionExport, AppError> {
    let submission = state.with_session(session_id, |session| Ok(session.submit()?))?;
    state.mark_submitted(session_id);

    let resource_id = submission.form_id.map(|id| id.to_string()).unwrap_or_default();
    state.record(
        AuditEvent::new(AuditAction::FormSubmitted, "form", resource_id, &state.role)
            .with_details(serde_json::json!({
                "sessionId": session_id,
                "answers": submission.result.len(),
            })),
    )?;
    Ok(SubmissionExport::from(&submission))
}

pub fn close_fill_session(state: &AppState, session_id: Uuid) -> Result<(), AppError> {
    state
        .forget_session(session_id)
        .map(|_| ())
        .ok_or_else(|| AppError::not_found(format!("no open fill session {session_id}")))
}

/// Printable version of a saved form, blank.
pub fn render_printable(state: &AppState, form_id: Uuid) -> Result<String, AppError> {
    let form = state.repository.get(form_id)?;
    Ok(medforms_export::render_blank(&form)?)
}

/// Printable version of the form being filled in a session, with its
/// current answers.
pub fn render_filled(state: &AppState, session_id: Uuid) -> Result<String, AppError> {
    state.with_session(session_id, |session| {
        Ok(medforms_export::render_printable(
            session.form(),
            session.answers(),
        )?)
    })
}

/// JSON export of a submitted session.
pub fn export_submission(state: &AppState, session_id: Uuid) -> Result<String, AppError> {
    state.with_session(session_id, |session| {
        let submission = session
            .submission()
            .ok_or_else(|| AppError::bad_request("session has not been submitted"))?;
        Ok(medforms_export::submission_json(submission)?)
    })
}
