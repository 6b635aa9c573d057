//! Flat answer keys to nested submission payload, and back.
//!
//! A field without answered nested fields maps to its raw answer. A field
//! with answered nested fields maps to `{ value, nested }`, where `value` is
//! its own answer and `nested` maps nested field ids to their results, to
//! any depth.

use std::collections::BTreeMap;

use medforms_core::{FieldKey, Form};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::answers::{AnswerSet, AnswerValue};
use crate::visibility::active_keys;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ResultNode {
    Branch {
        value: Option<AnswerValue>,
        nested: BTreeMap<String, ResultNode>,
    },
    Leaf(AnswerValue),
}

/// Top-level field id to result.
pub type ResultTree = BTreeMap<String, ResultNode>;

impl ResultNode {
    /// The answer given to the field itself.
    pub fn value(&self) -> Option<&AnswerValue> {
        match self {
            Self::Branch { value, .. } => value.as_ref(),
            Self::Leaf(value) => Some(value),
        }
    }

    pub fn nested(&self, field_id: &str) -> Option<&ResultNode> {
        match self {
            Self::Branch { nested, .. } => nested.get(field_id),
            Self::Leaf(_) => None,
        }
    }
}

#[derive(Default)]
struct Node {
    value: Option<AnswerValue>,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn insert(&mut self, path: &[String], value: AnswerValue) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        let child = self.children.entry(head.clone()).or_default();
        if rest.is_empty() {
            child.value = Some(value);
        } else {
            child.insert(rest, value);
        }
    }

    fn into_result(self) -> ResultNode {
        match self.value {
            Some(value) if self.children.is_empty() => ResultNode::Leaf(value),
            value => ResultNode::Branch {
                value,
                nested: into_tree(self.children),
            },
        }
    }
}

fn into_tree(children: BTreeMap<String, Node>) -> ResultTree {
    children
        .into_iter()
        .map(|(id, node)| (id, node.into_result()))
        .collect()
}

/// Structural nesting: split every key on its `.nested.` segments and build
/// the tree, without consulting any form.
pub fn nest(answers: &AnswerSet) -> ResultTree {
    let mut root = Node::default();
    for (key, value) in answers.iter() {
        root.insert(key.segments(), value.clone());
    }
    into_tree(root.children)
}

/// Nest only the answers that sit on active branches of `form`. Stale answers
/// under deselected options, and keys the form does not know, are dropped.
pub fn flatten(form: &Form, answers: &AnswerSet) -> ResultTree {
    let active = active_keys(form, answers);
    let mut visible = answers.clone();
    visible.retain(|key, _| active.contains(key));
    nest(&visible)
}

/// Inverse of [`nest`]: rebuild the flat keyed answers from a result tree.
pub fn expand(tree: &ResultTree) -> AnswerSet {
    let mut answers = AnswerSet::new();
    for (id, node) in tree {
        expand_node(&FieldKey::top(id.clone()), node, &mut answers);
    }
    answers
}

fn expand_node(key: &FieldKey, node: &ResultNode, answers: &mut AnswerSet) {
    match node {
        ResultNode::Leaf(value) => {
            answers.set(key.clone(), value.clone());
        }
        ResultNode::Branch { value, nested } => {
            if let Some(value) = value {
                answers.set(key.clone(), value.clone());
            }
            for (id, child) in nested {
                expand_node(&key.nested(id.clone()), child, answers);
            }
        }
    }
}
