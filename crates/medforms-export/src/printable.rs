//! Paper version of a form, blank or filled in.

use medforms_core::{Field, FieldKey, FieldKind, Form};
use medforms_engine::visibility::is_option_active;
use medforms_engine::{AnswerSet, AnswerValue};
use serde::Serialize;

use crate::error::ExportError;
use crate::render::render_template;

const TEMPLATE_NAME: &str = "printable.md";

const TEMPLATE: &str = r#"# {{ title }}
{% if description %}
{{ description }}
{% endif %}
{%- for block in blocks %}
{% if block.heading -%}
{{ block.indent }}## {{ block.label }}
{%- else -%}
{{ block.indent }}**{{ block.label }}**{% if block.required %} *{% endif %}
{% for line in block.lines -%}
{{ block.indent }}    {{ line }}
{% endfor -%}
{%- endif %}
{%- endfor %}
"#;

const BLANK_LINE: &str = "________________________";
const BLANK_DATE: &str = "__/__/____";

#[derive(Debug, Serialize)]
struct PrintView {
    title: String,
    description: String,
    blocks: Vec<Block>,
}

#[derive(Debug, Serialize)]
struct Block {
    indent: String,
    heading: bool,
    label: String,
    required: bool,
    lines: Vec<String>,
}

/// Render `form` for printing with nothing filled in.
pub fn render_blank(form: &Form) -> Result<String, ExportError> {
    render_printable(form, &AnswerSet::new())
}

/// Render `form` for printing with `answers` filled in. Nested fields appear
/// under their parent, indented one level per depth, only for options that
/// are currently selected.
pub fn render_printable(form: &Form, answers: &AnswerSet) -> Result<String, ExportError> {
    let title = match form.title.trim() {
        "" => "Untitled Form".to_string(),
        title => title.to_string(),
    };
    let mut blocks = Vec::new();
    collect_blocks(&form.fields, None, 0, answers, &mut blocks);

    tracing::debug!(form_id = ?form.id, blocks = blocks.len(), "rendering printable form");
    let view = PrintView {
        title,
        description: form.description.trim().to_string(),
        blocks,
    };
    render_template(TEMPLATE_NAME, TEMPLATE, &view)
}

fn collect_blocks(
    fields: &[Field],
    parent: Option<&FieldKey>,
    depth: usize,
    answers: &AnswerSet,
    blocks: &mut Vec<Block>,
) {
    let indent = "    ".repeat(depth);
    for field in fields.iter().filter(|f| !f.label.trim().is_empty()) {
        if field.kind == FieldKind::Heading {
            blocks.push(Block {
                indent: indent.clone(),
                heading: true,
                label: field.label.clone(),
                required: false,
                lines: Vec::new(),
            });
            continue;
        }

        let key = match parent {
            Some(parent) => parent.nested(field.id.clone()),
            None => FieldKey::top(field.id.clone()),
        };
        let answer = answers.get(&key);
        blocks.push(Block {
            indent: indent.clone(),
            heading: false,
            label: field.label.clone(),
            required: field.required,
            lines: answer_lines(field, answer),
        });

        for option in &field.options {
            if option.has_nested_fields() && is_option_active(field, option, answer) {
                collect_blocks(&option.nested_fields, Some(&key), depth + 1, answers, blocks);
            }
        }
    }
}

fn answer_lines(field: &Field, answer: Option<&AnswerValue>) -> Vec<String> {
    let text = answer
        .and_then(AnswerValue::as_text)
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match field.kind {
        FieldKind::Text => vec![text.unwrap_or(BLANK_LINE).to_string()],
        FieldKind::Date => vec![text.unwrap_or(BLANK_DATE).to_string()],
        FieldKind::Select => {
            let chosen = text.map(|value| {
                field
                    .option(value)
                    .map_or_else(|| value.to_string(), |o| o.label.clone())
            });
            vec![chosen.unwrap_or_else(|| BLANK_LINE.to_string())]
        }
        FieldKind::Radio | FieldKind::Checkbox => {
            let (open, close) = if field.kind == FieldKind::Radio {
                ('(', ')')
            } else {
                ('[', ']')
            };
            field
                .options
                .iter()
                .map(|option| {
                    let mark = if is_option_active(field, option, answer) {
                        'x'
                    } else {
                        ' '
                    };
                    format!("{open}{mark}{close} {}", option.label)
                })
                .collect()
        }
        FieldKind::Heading => Vec::new(),
    }
}
