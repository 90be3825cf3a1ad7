//! Annotation usages as written on declarations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An attribute value of an annotation usage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// Boolean flag
    Bool(bool),
    /// Integer constant
    Int(i64),
    /// String or enum constant name
    Str(String),
    /// Array of values
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Values as a list; a single value is a one-element list
    pub fn to_list(&self) -> Vec<&AnnotationValue> {
        match self {
            AnnotationValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        AnnotationValue::Str(s.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(s: String) -> Self {
        AnnotationValue::Str(s)
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        AnnotationValue::Bool(b)
    }
}

impl From<i64> for AnnotationValue {
    fn from(i: i64) -> Self {
        AnnotationValue::Int(i)
    }
}

impl<T: Into<AnnotationValue>> From<Vec<T>> for AnnotationValue {
    fn from(items: Vec<T>) -> Self {
        AnnotationValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// One annotation usage: a marker name plus its attribute values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    /// Qualified marker name
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationUse {
    pub fn new(name: impl Into<String>) -> Self {
        AnnotationUse {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Add an attribute value
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.values.insert(attribute.into(), value.into());
        self
    }
}
