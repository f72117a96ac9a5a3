use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional_text, parse_timestamp, FieldErrors, Validate};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub date: String,
}

/// Column values for the interactions table; `client_id` comes from the route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionFields {
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
}

impl Validate for InteractionInput {
    type Output = InteractionFields;

    fn validate(&self) -> Result<InteractionFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let kind = self.kind.trim().to_string();
        if kind.is_empty() {
            errors.add("type", "Type is required");
        }

        let date = if self.date.trim().is_empty() {
            errors.add("date", "Date is required");
            None
        } else {
            parse_timestamp(&self.date)
                .map_err(|message| errors.add("date", message))
                .ok()
        };

        match date {
            Some(date) => errors.finish(InteractionFields {
                kind,
                notes: optional_text(&self.notes),
                date,
            }),
            None => Err(errors),
        }
    }
}
