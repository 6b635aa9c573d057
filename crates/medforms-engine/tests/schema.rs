use medforms_core::{Field, FieldKey, FieldKind, Form};
use medforms_engine::{AnswerSet, AnswerValue, RuleKind, derive_rules, validate};

struct Fixture {
    form: Form,
    smoker: String,
    packs: String,
    quit_date: String,
    symptoms: String,
    details: String,
}

/// smoker (radio, optional): yes -> packs (text, required)
///                                  -> quit_date (date, required)
/// symptoms (checkbox, required): cough -> details (select, required)
///                                          with option "dry" -> onset (date, required)
fn fixture() -> Fixture {
    let mut form = Form::new("Respiratory screening", "");

    let smoker = form.add_field(FieldKind::Radio);
    smoker.set_label("Smoker");
    smoker.set_options(["Yes", "No"]).unwrap();
    let smoker = smoker.id.clone();

    let mut packs = Field::create(FieldKind::Text, "Packs per day");
    packs.set_required(true);
    let packs_id = packs.id.clone();
    form.add_nested_field(&smoker, "yes", packs).unwrap();

    let mut quit = Field::create(FieldKind::Date, "Quit date");
    quit.set_required(true);
    let quit_id = quit.id.clone();
    form.add_nested_field(&smoker, "yes", quit).unwrap();

    let symptoms = form.add_field(FieldKind::Checkbox);
    symptoms.set_label("Symptoms");
    symptoms.set_required(true);
    symptoms.set_options(["Cough", "Fever"]).unwrap();
    let symptoms = symptoms.id.clone();

    let mut details = Field::create(FieldKind::Select, "Cough type");
    details.set_required(true);
    details.set_options(["Dry", "Wet"]).unwrap();
    let details_id = details.id.clone();
    let mut onset = Field::create(FieldKind::Date, "Onset");
    onset.set_required(true);
    details.add_nested_field("dry", onset).unwrap();
    form.add_nested_field(&symptoms, "cough", details).unwrap();

    let heading = form.add_field(FieldKind::Heading);
    heading.set_label("Notes");

    Fixture {
        form,
        smoker,
        packs: packs_id,
        quit_date: quit_id,
        symptoms,
        details: details_id,
    }
}

#[test]
fn only_required_top_level_fields_without_selection() {
    let fx = fixture();
    let rules = derive_rules(&fx.form, &AnswerSet::new());

    assert_eq!(rules.len(), 1);
    let rule = rules.get(&FieldKey::top(&fx.symptoms)).unwrap();
    assert_eq!(rule.kind, RuleKind::NonEmptySet);
    assert!(!rules.contains(&FieldKey::top(&fx.smoker)));
}

#[test]
fn selected_option_activates_nested_rules_of_optional_parent() {
    let fx = fixture();
    let mut answers = AnswerSet::new();
    answers.set(FieldKey::top(&fx.smoker), AnswerValue::text("yes"));

    let rules = derive_rules(&fx.form, &answers);
    let packs = FieldKey::top(&fx.smoker).nested(&fx.packs);
    let quit = FieldKey::top(&fx.smoker).nested(&fx.quit_date);
    assert_eq!(rules.get(&packs).unwrap().kind, RuleKind::Required);
    assert_eq!(rules.get(&quit).unwrap().kind, RuleKind::ValidDate);
    assert!(!rules.contains(&FieldKey::top(&fx.smoker)));
}

#[test]
fn changing_radio_selection_removes_previous_branch() {
    let fx = fixture();
    let packs = FieldKey::top(&fx.smoker).nested(&fx.packs);

    let mut answers = AnswerSet::new();
    answers.set(FieldKey::top(&fx.smoker), AnswerValue::text("yes"));
    assert!(derive_rules(&fx.form, &answers).contains(&packs));
    assert!(validate(&fx.form, &answers).contains_key(&packs));

    answers.set(FieldKey::top(&fx.smoker), AnswerValue::text("no"));
    // Stale answer under the old branch stays in the set but is ignored.
    answers.set(packs.clone(), AnswerValue::text(""));
    assert!(!derive_rules(&fx.form, &answers).contains(&packs));
    assert!(!validate(&fx.form, &answers).contains_key(&packs));
}

#[test]
fn checkbox_branches_follow_set_membership_at_any_depth() {
    let fx = fixture();
    let symptoms = FieldKey::top(&fx.symptoms);
    let details = symptoms.nested(&fx.details);

    let mut answers = AnswerSet::new();
    answers.set(symptoms.clone(), AnswerValue::selection(["fever"]));
    assert!(!derive_rules(&fx.form, &answers).contains(&details));

    answers.set(symptoms.clone(), AnswerValue::selection(["fever", "cough"]));
    let rules = derive_rules(&fx.form, &answers);
    assert!(rules.contains(&details));
    assert_eq!(rules.len(), 2);

    answers.set(details.clone(), AnswerValue::text("dry"));
    let rules = derive_rules(&fx.form, &answers);
    let onset_key = rules
        .keys()
        .find(|key| key.depth() == 2)
        .cloned()
        .expect("third-level rule");
    assert!(onset_key.starts_with(&details));
    assert_eq!(rules.get(&onset_key).unwrap().kind, RuleKind::ValidDate);
}

#[test]
fn derivation_is_pure() {
    let fx = fixture();
    let mut answers = AnswerSet::new();
    answers.set(FieldKey::top(&fx.smoker), AnswerValue::text("yes"));
    answers.set(FieldKey::top(&fx.symptoms), AnswerValue::selection(["cough"]));

    let first = derive_rules(&fx.form, &answers);
    let second = derive_rules(&fx.form, &answers);
    assert_eq!(first, second);
    let kinds: Vec<_> = first.iter().map(|r| (r.key.clone(), r.kind)).collect();
    let again: Vec<_> = second.iter().map(|r| (r.key.clone(), r.kind)).collect();
    assert_eq!(kinds, again);
}

#[test]
fn headings_never_produce_rules() {
    let mut form = Form::new("Only headings", "");
    let heading = form.add_field(FieldKind::Heading);
    heading.required = true;

    let rules = derive_rules(&form, &AnswerSet::new());
    assert!(rules.is_empty());
}
