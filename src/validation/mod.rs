//! Typed form validation.
//!
//! Each submitted form is deserialized leniently (missing fields default to
//! empty) and then checked in full by `Validate::validate`, which either
//! yields the normalized fields ready for persistence or every field error
//! found in one pass.

pub mod auth;
pub mod client;
pub mod interaction;
pub mod opportunity;
pub mod task;

pub use auth::{LoginInput, RegisterInput};
pub use client::{ClientFields, ClientInput};
pub use interaction::{InteractionFields, InteractionInput};
pub use opportunity::{OpportunityFields, OpportunityInput};
pub use task::{TaskFields, TaskInput};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::Row;

/// Field name to human-readable message, keyed by the submitted (camelCase) name
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the first message for a field; later ones are ignored
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    /// `Ok(value)` when no errors were recorded
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

pub trait Validate {
    type Output;

    fn validate(&self) -> Result<Self::Output, FieldErrors>;
}

/// Serialize normalized fields into a store row
pub fn to_row<T: Serialize>(fields: &T) -> Result<Row, serde_json::Error> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!("expected an object, got {}", other))),
    }
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email".to_string());
    }
    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err("Invalid email".to_string());
    }
    Ok(())
}

pub fn min_chars(value: &str, min: usize, message: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Trimmed text, with blank input treated as absent
pub fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A number submitted either as JSON number or numeric string; blank means absent
pub fn optional_decimal(value: &Option<Value>) -> Result<Option<Decimal>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map(Some)
            .map_err(|_| "Must be a number".to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|_| "Must be a number".to_string()),
        Some(_) => Err("Must be a number".to_string()),
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| "Must be a date (YYYY-MM-DD)".to_string())
}

pub fn optional_date(value: &Option<String>) -> Result<Option<NaiveDate>, String> {
    optional_text(value).map(|s| parse_date(&s)).transpose()
}

/// `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| "Must be a date or timestamp".to_string())
}

pub fn optional_uuid(value: &Option<String>) -> Result<Option<Uuid>, String> {
    optional_text(value)
        .map(|s| Uuid::parse_str(&s).map_err(|_| "Must be a valid id".to_string()))
        .transpose()
}
