//! Attribute-map snapshots of component state.
//!
//! A [`Memento`] is an ordered, string-keyed map whose values may nest further
//! mementos and lists. It is serde-serializable so persistence layers can
//! choose their own wire format; the core never commits to one.

use crate::error::MementoError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attribute value inside a [`Memento`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MementoValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    List(Vec<MementoValue>),
    Map(Memento),
}

impl From<bool> for MementoValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MementoValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MementoValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for MementoValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MementoValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Memento> for MementoValue {
    fn from(value: Memento) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<MementoValue>> for MementoValue {
    fn from(value: Vec<MementoValue>) -> Self {
        Self::List(value)
    }
}

/// Ordered string-keyed attribute map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memento {
    attributes: BTreeMap<String, MementoValue>,
}

impl Memento {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<MementoValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<MementoValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&MementoValue> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MementoValue)> {
        self.attributes.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn require(&self, name: &str) -> Result<&MementoValue, MementoError> {
        self.get(name).ok_or_else(|| MementoError::missing(name))
    }

    pub fn require_text(&self, name: &str) -> Result<&str, MementoError> {
        match self.require(name)? {
            MementoValue::Text(value) => Ok(value),
            _ => Err(MementoError::wrong_type(name, "text")),
        }
    }

    pub fn require_integer(&self, name: &str) -> Result<i64, MementoError> {
        match self.require(name)? {
            MementoValue::Integer(value) => Ok(*value),
            _ => Err(MementoError::wrong_type(name, "integer")),
        }
    }

    /// Integer attribute that must fit table coordinates.
    pub fn require_i32(&self, name: &str) -> Result<i32, MementoError> {
        let value = self.require_integer(name)?;
        i32::try_from(value).map_err(|_| MementoError::OutOfRange {
            name: name.to_string(),
            value,
        })
    }

    pub fn require_map(&self, name: &str) -> Result<&Memento, MementoError> {
        match self.require(name)? {
            MementoValue::Map(value) => Ok(value),
            _ => Err(MementoError::wrong_type(name, "map")),
        }
    }

    pub fn require_list(&self, name: &str) -> Result<&[MementoValue], MementoError> {
        match self.require(name)? {
            MementoValue::List(values) => Ok(values),
            _ => Err(MementoError::wrong_type(name, "list")),
        }
    }
}
