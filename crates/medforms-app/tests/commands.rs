use medforms_app::commands;
use medforms_app::config::AppConfig;
use medforms_app::{AppError, AppState};
use medforms_audit::AuditAction;
use medforms_core::{Field, FieldKey, FieldKind, Form};
use medforms_engine::{AnswerValue, SessionState};
use serde_json::json;
use uuid::Uuid;

/// Radio "Pregnant" (required) with a required "Due date" under "yes".
fn pregnancy_form() -> (Form, String, String) {
    let mut form = Form::new("Pre-op checklist", "");
    let radio = form.add_field(FieldKind::Radio);
    radio.set_label("Pregnant");
    radio.set_required(true);
    radio.set_options(["Yes", "No"]).unwrap();
    let radio = radio.id.clone();

    let mut due = Field::create(FieldKind::Date, "Due date");
    due.set_required(true);
    let due_id = due.id.clone();
    form.add_nested_field(&radio, "yes", due).unwrap();
    (form, radio, due_id)
}

#[test]
fn save_list_and_delete() {
    let state = AppState::in_memory("admin");
    let (form, _, _) = pregnancy_form();

    let saved = commands::save_form(&state, form).unwrap();
    let id = saved.id.unwrap();
    let listing = commands::list_forms(&state).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].field_count, 2);

    commands::delete_form(&state, id).unwrap();
    assert!(commands::list_forms(&state).unwrap().is_empty());
    assert!(matches!(
        commands::get_form(&state, id),
        Err(AppError::NotFound { .. })
    ));
}

#[test]
fn saving_an_empty_form_is_a_bad_request() {
    let state = AppState::in_memory("admin");
    let err = commands::save_form(&state, Form::new("", "")).unwrap_err();
    assert!(matches!(err, AppError::BadRequest { .. }));
}

#[test]
fn edit_pointer_round_trip() {
    let state = AppState::in_memory("admin");
    let (form, _, _) = pregnancy_form();
    let id = commands::save_form(&state, form).unwrap().id.unwrap();

    assert!(commands::form_to_edit(&state).unwrap().is_none());
    commands::edit_form(&state, id).unwrap();
    assert_eq!(commands::form_to_edit(&state).unwrap().unwrap().id, Some(id));
    commands::finish_editing(&state).unwrap();
    assert!(commands::form_to_edit(&state).unwrap().is_none());
}

#[test]
fn fill_and_submit_nested_answers() {
    let state = AppState::in_memory("nurse");
    let (form, radio, due) = pregnancy_form();
    let form_id = commands::save_form(&state, form).unwrap().id.unwrap();

    let view = commands::open_fill_session(&state, form_id).unwrap();
    assert_eq!(view.state, SessionState::Empty);
    let session = view.session_id;

    let radio_key = FieldKey::top(&radio);
    let due_key = radio_key.nested(&due);
    commands::set_answer(&state, session, &radio_key.to_string(), AnswerValue::text("yes"))
        .unwrap();
    let nested = commands::visible_nested_fields(&state, session, &radio_key.to_string()).unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].label, "Due date");

    let err = commands::submit(&state, session).unwrap_err();
    let AppError::Invalid { errors } = err else {
        panic!("expected validation errors");
    };
    assert!(errors.contains_key(&due_key));

    let view = commands::set_answer(
        &state,
        session,
        &due_key.to_string(),
        AnswerValue::text("2025-01-15"),
    )
    .unwrap();
    assert_eq!(view.state, SessionState::Editing);

    let export = commands::submit(&state, session).unwrap();
    assert_eq!(export.form_id, Some(form_id));
    assert_eq!(
        serde_json::to_value(&export.answers).unwrap(),
        json!({
            (radio.as_str()): {
                "value": "yes",
                "nested": { (due.as_str()): "2025-01-15" }
            }
        })
    );

    let raw = commands::export_submission(&state, session).unwrap();
    assert!(raw.contains("\"formId\""));

    let err = commands::set_answer(&state, session, &radio_key.to_string(), AnswerValue::text("no"))
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest { .. }));

    commands::close_fill_session(&state, session).unwrap();
    assert!(matches!(
        commands::render_filled(&state, session),
        Err(AppError::NotFound { .. })
    ));
}

#[test]
fn filling_a_deleted_form_is_not_found() {
    let state = AppState::in_memory("nurse");
    let err = commands::open_fill_session(&state, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[test]
fn malformed_keys_are_rejected() {
    let state = AppState::in_memory("nurse");
    let (form, _, _) = pregnancy_form();
    let form_id = commands::save_form(&state, form).unwrap().id.unwrap();
    let session = commands::open_fill_session(&state, form_id).unwrap().session_id;

    let err = commands::set_answer(&state, session, "a.nested.", AnswerValue::text("x"))
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest { .. }));
    let err = commands::set_answer(&state, session, "nope", AnswerValue::text("x")).unwrap_err();
    assert!(matches!(err, AppError::BadRequest { .. }));
}

#[test]
fn printable_render_through_commands() {
    let state = AppState::in_memory("admin");
    let (form, radio, _) = pregnancy_form();
    let form_id = commands::save_form(&state, form).unwrap().id.unwrap();

    let blank = commands::render_printable(&state, form_id).unwrap();
    assert!(blank.contains("( ) Yes"));
    assert!(!blank.contains("Due date"));

    let session = commands::open_fill_session(&state, form_id).unwrap().session_id;
    commands::set_answer(&state, session, &radio, AnswerValue::text("yes")).unwrap();
    let filled = commands::render_filled(&state, session).unwrap();
    assert!(filled.contains("(x) Yes"));
    assert!(filled.contains("__/__/____"));
}

#[test]
fn file_backed_state_writes_audit_trail() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default_for(dir.path());
    let (form, _, _) = pregnancy_form();

    let id = {
        let state = AppState::open(&config, "admin");
        let id = commands::save_form(&state, form).unwrap().id.unwrap();
        commands::edit_form(&state, id).unwrap();
        id
    };

    let state = AppState::open(&config, "admin");
    assert_eq!(commands::get_form(&state, id).unwrap().id, Some(id));
    assert_eq!(commands::form_to_edit(&state).unwrap().unwrap().id, Some(id));

    let events = state.audit_trail().unwrap().read_all().unwrap();
    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(actions, [AuditAction::FormSaved, AuditAction::EditStarted]);
    assert!(events.iter().all(|e| e.actor_role == "admin"));
}

#[test]
fn oldest_submitted_sessions_are_evicted() {
    let state = AppState::in_memory("nurse").with_retained_submissions(2);
    let mut form = Form::new("Feedback", "");
    form.add_field(FieldKind::Text).set_label("Comments");
    let form_id = commands::save_form(&state, form).unwrap().id.unwrap();

    let sessions: Vec<_> = (0..3)
        .map(|_| {
            let id = commands::open_fill_session(&state, form_id).unwrap().session_id;
            commands::submit(&state, id).unwrap();
            id
        })
        .collect();

    assert!(matches!(
        commands::export_submission(&state, sessions[0]),
        Err(AppError::NotFound { .. })
    ));
    assert!(commands::export_submission(&state, sessions[1]).is_ok());
    assert!(commands::export_submission(&state, sessions[2]).is_ok());

    let open = commands::open_fill_session(&state, form_id).unwrap().session_id;
    commands::close_fill_session(&state, sessions[2]).unwrap();
    commands::submit(&state, open).unwrap();
    assert!(commands::export_submission(&state, sessions[1]).is_ok());
}

#[test]
fn saving_a_blank_label_is_a_bad_request() {
    let state = AppState::in_memory("admin");
    let (mut form, _, due) = pregnancy_form();
    form.field_mut(&due).unwrap().set_label(" ");

    let err = commands::save_form(&state, form).unwrap_err();
    assert!(matches!(err, AppError::BadRequest { ref message } if message.contains("no label")));
    assert!(commands::list_forms(&state).unwrap().is_empty());
}
