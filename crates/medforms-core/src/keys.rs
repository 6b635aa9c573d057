//! Composite answer keys.
//!
//! A top-level field answers under its own id. A field nested under an option
//! of a parent field answers under `<parent key>.nested.<field id>`, extended
//! one segment per nesting level. The key is kept as a list of field ids and
//! only joined into a string at the serialization boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormError;

/// Marker joining the segments of a composite key.
pub const NESTED_SEPARATOR: &str = ".nested.";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    segments: Vec<String>,
}

impl FieldKey {
    /// Key of a top-level field.
    pub fn top(field_id: impl Into<String>) -> Self {
        Self {
            segments: vec![field_id.into()],
        }
    }

    /// Key of `field_id` nested under the field answering at `self`.
    pub fn nested(&self, field_id: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field_id.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Id of the field this key answers for.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Id of the top-level field governing this key.
    pub fn root(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<FieldKey> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// True when the field `field_id` appears anywhere along this key.
    pub fn passes_through(&self, field_id: &str) -> bool {
        self.segments.iter().any(|segment| segment == field_id)
    }

    /// True when `self` equals `ancestor` or lies beneath it.
    pub fn starts_with(&self, ancestor: &FieldKey) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(NESTED_SEPARATOR))
    }
}

impl FromStr for FieldKey {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split(NESTED_SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(FormError::InvalidFieldKey(s.to_string()));
        }
        Ok(Self { segments })
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
