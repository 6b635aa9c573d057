use std::collections::BTreeSet;

use medforms_core::{Field, FieldKey, FieldOption, Form};

use crate::answers::{AnswerSet, AnswerValue};

/// Whether `option` is the current selection of `field` given its answer.
pub fn is_option_active(field: &Field, option: &FieldOption, answer: Option<&AnswerValue>) -> bool {
    answer.is_some_and(|a| a.selects(field.kind, &option.value))
}

/// Visit every input field reachable from the top level through currently
/// selected options, in form order, together with its answer key.
pub fn walk_active<'f>(
    form: &'f Form,
    answers: &AnswerSet,
    visit: &mut dyn FnMut(&'f Field, &FieldKey),
) {
    walk_fields(&form.fields, None, answers, visit);
}

fn walk_fields<'f>(
    fields: &'f [Field],
    parent: Option<&FieldKey>,
    answers: &AnswerSet,
    visit: &mut dyn FnMut(&'f Field, &FieldKey),
) {
    for field in fields {
        if !field.is_input() {
            continue;
        }
        let key = match parent {
            Some(parent) => parent.nested(field.id.clone()),
            None => FieldKey::top(field.id.clone()),
        };
        visit(field, &key);

        let answer = answers.get(&key);
        for option in &field.options {
            if is_option_active(field, option, answer) {
                walk_fields(&option.nested_fields, Some(&key), answers, visit);
            }
        }
    }
}

/// Keys of every input field on an active branch.
pub fn active_keys(form: &Form, answers: &AnswerSet) -> BTreeSet<FieldKey> {
    let mut keys = BTreeSet::new();
    walk_active(form, answers, &mut |_, key| {
        keys.insert(key.clone());
    });
    keys
}

/// Resolve `key` to its field, requiring every option on the path to be
/// selected in `answers`.
pub fn locate<'f>(form: &'f Form, answers: &AnswerSet, key: &FieldKey) -> Option<&'f Field> {
    resolve(form, key, Some(answers))
}

/// Resolve `key` to its field through any option, selected or not.
pub fn locate_any<'f>(form: &'f Form, key: &FieldKey) -> Option<&'f Field> {
    resolve(form, key, None)
}

fn resolve<'f>(form: &'f Form, key: &FieldKey, answers: Option<&AnswerSet>) -> Option<&'f Field> {
    let mut segments = key.segments().iter();
    let root = segments.next()?;
    let mut field = form.fields.iter().find(|f| &f.id == root)?;
    let mut current = FieldKey::top(root.clone());

    for segment in segments {
        let parent = field;
        let answer = answers.map(|a| a.get(&current));
        field = parent
            .options
            .iter()
            .filter(|option| match answer {
                Some(answer) => is_option_active(parent, option, answer),
                None => true,
            })
            .flat_map(|option| &option.nested_fields)
            .find(|nested| &nested.id == segment)?;
        current = current.nested(segment.clone());
    }

    Some(field)
}

/// Nested fields to render under the field answering at `key`: those owned
/// by its currently selected options, in option order. Empty when the key
/// itself sits on an inactive branch.
pub fn visible_nested_fields<'f>(
    form: &'f Form,
    answers: &AnswerSet,
    key: &FieldKey,
) -> Vec<&'f Field> {
    let Some(field) = locate(form, answers, key) else {
        return Vec::new();
    };
    let answer = answers.get(key);
    field
        .options
        .iter()
        .filter(|option| is_option_active(field, option, answer))
        .flat_map(|option| &option.nested_fields)
        .collect()
}
