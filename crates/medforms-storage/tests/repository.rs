use std::sync::Arc;

use medforms_core::store_keys::{FORM_TO_EDIT, FORMS};
use medforms_core::{Field, FieldKind, Form, FormError};
use medforms_storage::{FileStore, FormRepository, KeyValueStore, MemoryStore, StorageError};
use serde_json::json;
use uuid::Uuid;

fn repository() -> (Arc<MemoryStore>, FormRepository) {
    let store = Arc::new(MemoryStore::new());
    let repo = FormRepository::new(store.clone());
    (store, repo)
}

fn sample_form(title: &str) -> Form {
    let mut form = Form::new(title, "Filled at reception");
    let radio = form.add_field(FieldKind::Radio);
    radio.set_label("Insured");
    radio.set_options(["Yes", "No"]).unwrap();
    let radio = radio.id.clone();
    form.add_nested_field(&radio, "yes", Field::create(FieldKind::Text, "Provider"))
        .unwrap();
    form
}

#[test]
fn empty_store_lists_nothing() {
    let (_, repo) = repository();
    assert!(repo.list().unwrap().is_empty());
    assert!(repo.editing().unwrap().is_none());
}

#[test]
fn save_appends_then_upserts() {
    let (_, repo) = repository();
    let first = repo.save(sample_form("Intake")).unwrap();
    let second = repo.save(sample_form("Discharge")).unwrap();
    assert_ne!(first.id, second.id);

    let mut edited = repo.get(first.id.unwrap()).unwrap();
    edited.title = "Intake v2".to_string();
    let saved = repo.save(edited).unwrap();

    let forms = repo.list().unwrap();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].title, "Intake v2");
    assert_eq!(saved.created_at, first.created_at);
    assert!(saved.updated_at > first.updated_at);
}

#[test]
fn save_rejects_invalid_forms() {
    let (store, repo) = repository();
    let err = repo.save(Form::new("No fields", "")).unwrap_err();
    assert!(matches!(err, StorageError::Form(FormError::NoFields)));
    assert!(store.get(FORMS).unwrap().is_none());
}

#[test]
fn blank_labelled_field_is_rejected_instead_of_lost() {
    let (store, repo) = repository();
    let mut form = Form::new("Vitals", "");
    let blank = form.add_field(FieldKind::Text);
    blank.set_label("   ");
    let blank_id = blank.id.clone();

    let err = repo.save(form).unwrap_err();
    assert!(matches!(
        err,
        StorageError::Form(FormError::EmptyLabel { field_id }) if field_id == blank_id
    ));
    assert!(store.get(FORMS).unwrap().is_none());

    let saved = repo.save(sample_form("Intake")).unwrap();
    let loaded = repo.get(saved.id.unwrap()).unwrap();
    assert_eq!(loaded.total_field_count(), saved.total_field_count());
}

#[test]
fn non_object_entries_are_skipped() {
    let (store, repo) = repository();
    let kept = repo.save(sample_form("Intake")).unwrap();
    let stored = store.get(FORMS).unwrap().unwrap();
    let mut raw: serde_json::Value = serde_json::from_str(&stored).unwrap();
    raw.as_array_mut().unwrap().push(json!("not a form"));
    raw.as_array_mut().unwrap().push(json!(42));
    store.put(FORMS, &raw.to_string()).unwrap();

    let forms = repo.list().unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].id, kept.id);
}

#[test]
fn summaries_count_nested_fields() {
    let (_, repo) = repository();
    repo.save(sample_form("Intake")).unwrap();
    let summaries = repo.summaries().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].field_count, 2);
}

#[test]
fn get_and_delete_missing_form() {
    let (_, repo) = repository();
    let id = Uuid::new_v4();
    assert!(matches!(repo.get(id), Err(StorageError::NotFound { .. })));
    assert!(matches!(repo.delete(id), Err(StorageError::NotFound { .. })));
}

#[test]
fn delete_clears_edit_pointer() {
    let (store, repo) = repository();
    let form = repo.save(sample_form("Intake")).unwrap();
    let id = form.id.unwrap();

    repo.begin_edit(id).unwrap();
    assert_eq!(repo.editing().unwrap(), Some(id));
    assert_eq!(repo.load_for_edit().unwrap().unwrap().title, "Intake");

    repo.delete(id).unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert!(store.get(FORM_TO_EDIT).unwrap().is_none());
}

#[test]
fn dangling_or_garbled_edit_pointer_is_cleared() {
    let (store, repo) = repository();
    store.put(FORM_TO_EDIT, &Uuid::new_v4().to_string()).unwrap();
    assert!(repo.load_for_edit().unwrap().is_none());
    assert!(store.get(FORM_TO_EDIT).unwrap().is_none());

    store.put(FORM_TO_EDIT, "not-a-uuid").unwrap();
    assert!(repo.editing().unwrap().is_none());
    assert!(store.get(FORM_TO_EDIT).unwrap().is_none());
}

#[test]
fn begin_edit_requires_existing_form() {
    let (_, repo) = repository();
    let err = repo.begin_edit(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn unparseable_collection_resets_to_empty() {
    let (store, repo) = repository();
    store.put(FORMS, "{not json").unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert_eq!(store.get(FORMS).unwrap().as_deref(), Some("[]"));

    store.put(FORMS, r#"{"title": "not an array"}"#).unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert_eq!(store.get(FORMS).unwrap().as_deref(), Some("[]"));
}

#[test]
fn invalid_entries_are_skipped_and_fields_sanitized() {
    let (store, repo) = repository();
    let id = Uuid::new_v4();
    let stored = json!([
        "garbage",
        { "title": "No fields key", "id": Uuid::new_v4() },
        { "title": "No id", "fields": [] },
        {
            "id": id,
            "title": "Legacy",
            "description": "",
            "fields": [
                { "id": "a", "type": "text", "label": "  " },
                { "id": "b", "type": "radio", "label": "Smoker",
                  "options": [
                      "Yes",
                      { "value": "no", "label": "No", "nestedFields": [
                          { "id": "c", "type": "text", "label": "" },
                          { "id": "d", "type": "date", "label": "Since" }
                      ] }
                  ] },
                { "id": "e", "type": "text" }
            ]
        }
    ]);
    store.put(FORMS, &stored.to_string()).unwrap();

    let forms = repo.list().unwrap();
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form.id, Some(id));
    assert_eq!(form.fields.len(), 1);

    let smoker = &form.fields[0];
    assert_eq!(smoker.options[0].value, "yes");
    assert_eq!(smoker.options[0].label, "Yes");
    assert_eq!(smoker.options[1].nested_fields.len(), 1);
    assert_eq!(smoker.options[1].nested_fields[0].id, "d");
    assert_eq!(form.total_field_count(), 2);
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let repo = FormRepository::new(Arc::new(FileStore::new(dir.path())));
        repo.save(sample_form("Intake")).unwrap()
    };

    let repo = FormRepository::new(Arc::new(FileStore::new(dir.path())));
    let loaded = repo.get(saved.id.unwrap()).unwrap();
    assert_eq!(loaded, saved);
    assert!(dir.path().join("forms.json").exists());
    assert!(!dir.path().join("forms.json.tmp").exists());
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert!(matches!(
        store.put("../escape", "x"),
        Err(StorageError::InvalidKey(_))
    ));
    assert!(store.get("missing").unwrap().is_none());
    store.delete("missing").unwrap();
}
