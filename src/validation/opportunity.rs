use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{min_chars, optional_date, optional_decimal, optional_text, optional_uuid, FieldErrors, Validate};

const PROBABILITY_MESSAGE: &str = "Probability must be a whole number between 0 and 100";
const AMOUNT_MESSAGE: &str = "Amount must have at most 2 decimal places and be below 1,000,000,000,000";

/// numeric(14,2): twelve integer digits, two fractional
const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpportunityInput {
    pub client_id: Option<String>,
    pub title: String,
    pub amount: Option<Value>,
    pub stage: String,
    pub probability: Option<Value>,
    pub expected_close_date: Option<String>,
    pub notes: Option<String>,
}

/// Column values for the opportunities table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityFields {
    pub client_id: Uuid,
    pub title: String,
    pub amount: Option<Decimal>,
    pub stage: String,
    pub probability: i32,
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn probability(value: &Option<Value>) -> Result<i32, String> {
    let decimal = optional_decimal(value)
        .map_err(|_| PROBABILITY_MESSAGE.to_string())?
        .ok_or_else(|| "Probability is required".to_string())?;
    if !decimal.fract().is_zero() || decimal < Decimal::ZERO || decimal > Decimal::ONE_HUNDRED {
        return Err(PROBABILITY_MESSAGE.to_string());
    }
    decimal.to_i32().ok_or_else(|| PROBABILITY_MESSAGE.to_string())
}

fn amount(value: &Option<Value>) -> Result<Option<Decimal>, String> {
    let Some(decimal) = optional_decimal(value)? else {
        return Ok(None);
    };
    let decimal = decimal.normalize();
    if decimal.scale() > 2 || decimal.abs() >= Decimal::from(AMOUNT_LIMIT) {
        return Err(AMOUNT_MESSAGE.to_string());
    }
    Ok(Some(decimal))
}

impl Validate for OpportunityInput {
    type Output = OpportunityFields;

    fn validate(&self) -> Result<OpportunityFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let client_id = match optional_uuid(&self.client_id) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                errors.add("clientId", "Client is required");
                None
            }
            Err(message) => {
                errors.add("clientId", message);
                None
            }
        };

        let title = self.title.trim().to_string();
        errors.check("title", min_chars(&title, 2, "Title must be at least 2 characters"));

        let stage = self.stage.trim().to_string();
        if stage.is_empty() {
            errors.add("stage", "Stage is required");
        }

        let amount = amount(&self.amount)
            .map_err(|message| errors.add("amount", message))
            .unwrap_or(None);
        let probability = probability(&self.probability)
            .map_err(|message| errors.add("probability", message))
            .unwrap_or(0);
        let expected_close_date = optional_date(&self.expected_close_date)
            .map_err(|message| errors.add("expectedCloseDate", message))
            .unwrap_or(None);

        match client_id {
            Some(client_id) => errors.finish(OpportunityFields {
                client_id,
                title,
                amount,
                stage,
                probability,
                expected_close_date,
                notes: optional_text(&self.notes),
            }),
            None => Err(errors),
        }
    }
}
