//! Parsed FIX message as exchanged with the session engine.

use std::collections::BTreeMap;

use super::dictionary::{describe_value, field_name};
use super::tags::{self, Tag};

/// Header and body fields, stored as the exact wire strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixMessage {
    header: BTreeMap<Tag, String>,
    body: BTreeMap<Tag, String>,
}

impl FixMessage {
    pub fn new(msg_type: &str) -> Self {
        let mut msg = Self::default();
        msg.set_header(tags::MSG_TYPE, msg_type);
        msg
    }

    pub fn set_header(&mut self, tag: Tag, value: impl Into<String>) {
        self.header.insert(tag, value.into());
    }

    pub fn set_body(&mut self, tag: Tag, value: impl Into<String>) {
        self.body.insert(tag, value.into());
    }

    /// Builder-style variant of [`set_body`](Self::set_body)
    pub fn with(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.set_body(tag, value);
        self
    }

    pub fn header(&self, tag: Tag) -> Option<&str> {
        self.header.get(&tag).map(String::as_str)
    }

    pub fn body(&self, tag: Tag) -> Option<&str> {
        self.body.get(&tag).map(String::as_str)
    }

    /// Body field first, then header.
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.body(tag).or_else(|| self.header(tag))
    }

    /// Field value or empty string, for optional wire fields.
    pub fn get_or_empty(&self, tag: Tag) -> String {
        self.get(tag).unwrap_or_default().to_string()
    }

    /// Non-empty field value.
    pub fn get_present(&self, tag: Tag) -> Option<String> {
        self.get(tag).filter(|v| !v.is_empty()).map(str::to_string)
    }

    pub fn msg_type(&self) -> Option<&str> {
        self.header(tags::MSG_TYPE)
    }

    pub fn has_body(&self, tag: Tag) -> bool {
        self.body.contains_key(&tag)
    }

    pub fn body_fields(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.body.iter().map(|(t, v)| (*t, v.as_str()))
    }

    /// One-line rendering with field names and value meanings.
    pub fn describe(&self) -> String {
        self.header
            .iter()
            .chain(self.body.iter())
            .map(|(tag, value)| match describe_value(*tag, value) {
                Some(meaning) => format!("{}({})={}[{}]", tag, field_name(*tag), value, meaning),
                None => format!("{}({})={}", tag, field_name(*tag), value),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
