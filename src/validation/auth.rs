use serde::{Deserialize, Serialize};

use super::{min_chars, validate_email_format, FieldErrors, Validate};

const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Normalized credentials; the email is trimmed and lowercased
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginInput {
    type Output = Credentials;

    fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self.email.trim().to_lowercase();
        errors.check("email", validate_email_format(&email));
        errors.check("password", min_chars(&self.password, 6, PASSWORD_MESSAGE));
        errors.finish(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub credentials: Credentials,
    pub full_name: String,
}

impl Validate for RegisterInput {
    type Output = Registration;

    fn validate(&self) -> Result<Registration, FieldErrors> {
        let login = LoginInput {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        let mut errors = FieldErrors::new();
        let credentials = match login.validate() {
            Ok(credentials) => Some(credentials),
            Err(login_errors) => {
                for (field, message) in login_errors.into_map() {
                    errors.add(&field, message);
                }
                None
            }
        };

        let full_name = self.full_name.trim().to_string();
        errors.check("fullName", min_chars(&full_name, 2, "Name must be at least 2 characters"));

        match credentials {
            Some(credentials) => errors.finish(Registration { credentials, full_name }),
            None => Err(errors),
        }
    }
}
