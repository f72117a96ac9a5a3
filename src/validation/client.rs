use serde::{Deserialize, Serialize};

use super::{min_chars, optional_text, validate_email_format, FieldErrors, Validate};
use crate::database::models::ClientStatus;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
}

/// Column values for the clients table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: ClientStatus,
}

impl Validate for ClientInput {
    type Output = ClientFields;

    fn validate(&self) -> Result<ClientFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim().to_string();
        errors.check("name", min_chars(&name, 2, "Name must be at least 2 characters"));

        let email = self.email.trim().to_string();
        errors.check("email", validate_email_format(&email));

        let status = match optional_text(&self.status) {
            None => ClientStatus::default(),
            Some(s) => s.parse().unwrap_or_else(|_| {
                errors.add("status", "Status must be one of active, inactive, prospect");
                ClientStatus::default()
            }),
        };

        errors.finish(ClientFields {
            name,
            email,
            phone: optional_text(&self.phone),
            company: optional_text(&self.company),
            position: optional_text(&self.position),
            status,
        })
    }
}
