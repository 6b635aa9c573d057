use medforms_core::{Field, FieldKey, FieldKind, Form};
use medforms_engine::{AnswerSet, AnswerValue, ResultNode, expand, flatten, nest};
use serde_json::json;

/// Three levels: visit (radio) -> yes -> reason (select) -> other -> detail (text).
fn deep_form() -> (Form, FieldKey, FieldKey, FieldKey) {
    let mut form = Form::new("Follow-up", "");
    let visit = form.add_field(FieldKind::Radio);
    visit.set_label("Follow-up visit");
    visit.set_options(["Yes", "No"]).unwrap();
    let visit = visit.id.clone();

    let mut reason = Field::create(FieldKind::Select, "Reason");
    reason.set_options(["Pain", "Other"]).unwrap();
    let reason_id = reason.id.clone();
    let detail = Field::create(FieldKind::Text, "Detail");
    let detail_id = detail.id.clone();
    reason.add_nested_field("other", detail).unwrap();
    form.add_nested_field(&visit, "yes", reason).unwrap();

    let visit_key = FieldKey::top(&visit);
    let reason_key = visit_key.nested(&reason_id);
    let detail_key = reason_key.nested(&detail_id);
    (form, visit_key, reason_key, detail_key)
}

#[test]
fn nests_to_any_depth() {
    let (form, visit, reason, detail) = deep_form();
    let mut answers = AnswerSet::new();
    answers.set(visit.clone(), AnswerValue::text("yes"));
    answers.set(reason.clone(), AnswerValue::text("other"));
    answers.set(detail.clone(), AnswerValue::text("Wound check"));

    let tree = flatten(&form, &answers);
    let node = &tree[visit.root()];
    assert_eq!(node.value(), Some(&AnswerValue::text("yes")));
    let reason_node = node.nested(reason.leaf()).unwrap();
    assert_eq!(reason_node.value(), Some(&AnswerValue::text("other")));
    assert_eq!(
        reason_node.nested(detail.leaf()),
        Some(&ResultNode::Leaf(AnswerValue::text("Wound check")))
    );

    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({
            (visit.root()): {
                "value": "yes",
                "nested": {
                    (reason.leaf()): {
                        "value": "other",
                        "nested": { (detail.leaf()): "Wound check" }
                    }
                }
            }
        })
    );
}

#[test]
fn drops_answers_on_inactive_branches() {
    let (form, visit, reason, detail) = deep_form();
    let mut answers = AnswerSet::new();
    answers.set(visit.clone(), AnswerValue::text("yes"));
    answers.set(reason.clone(), AnswerValue::text("pain"));
    answers.set(detail.clone(), AnswerValue::text("stale"));
    answers.set(FieldKey::top("unknown"), AnswerValue::text("x"));

    let tree = flatten(&form, &answers);
    assert_eq!(tree.len(), 1);
    let reason_node = tree[visit.root()].nested(reason.leaf()).unwrap();
    assert_eq!(reason_node, &ResultNode::Leaf(AnswerValue::text("pain")));
}

#[test]
fn nest_is_structural() {
    let mut answers = AnswerSet::new();
    let parent = FieldKey::top("p");
    answers.set(parent.nested("c"), AnswerValue::text("child only"));

    let tree = nest(&answers);
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({ "p": { "value": null, "nested": { "c": "child only" } } })
    );
}

#[test]
fn expand_inverts_nest() {
    let (form, visit, reason, detail) = deep_form();
    let mut answers = AnswerSet::new();
    answers.set(visit, AnswerValue::text("yes"));
    answers.set(reason, AnswerValue::text("other"));
    answers.set(detail, AnswerValue::text("Suture removal"));

    let tree = flatten(&form, &answers);
    assert_eq!(expand(&tree), answers);
}

#[test]
fn result_tree_deserializes_from_payload() {
    let payload = json!({
        "a": ["x", "y"],
        "b": { "value": "yes", "nested": { "c": "2024-01-02" } }
    });
    let tree: medforms_engine::ResultTree = serde_json::from_value(payload).unwrap();

    let answers = expand(&tree);
    assert_eq!(answers.len(), 3);
    assert_eq!(
        answers.get(&FieldKey::top("a")),
        Some(&AnswerValue::selection(["y", "x"]))
    );
    assert_eq!(
        answers.get(&FieldKey::top("b").nested("c")),
        Some(&AnswerValue::text("2024-01-02"))
    );
}
