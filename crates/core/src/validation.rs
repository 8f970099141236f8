//! Form validation.
//!
//! Forms collect every problem up front and report them per field, so a user sees all of
//! them at once and no request is sent until the form is clean.

use crate::categories::{AgeBracket, SexCode};
use crate::constants::MIN_PASSWORD_LEN;
use crate::models::UserPayload;
use crate::{CardioError, CardioResult};
use cardio_types::{Dni, EmailAddress, NonEmptyText, TextError};
use serde::Serialize;
use std::fmt;

/// One problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Whether a user form creates a new account (password required) or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Raw user form input, as typed.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub dni: String,
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub role_id: Option<i64>,
    pub password: Option<String>,
}

/// Collects field errors while turning raw input into validated values.
#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn required(&mut self, field: &'static str, value: &str) -> Option<NonEmptyText> {
        match NonEmptyText::new(value) {
            Ok(text) => Some(text),
            Err(_) => {
                self.errors.push(FieldError::new(field, "is required"));
                None
            }
        }
    }

    fn text_error(&mut self, field: &'static str, err: TextError) {
        let message = match err {
            TextError::Empty => "is required".to_string(),
            other => other.to_string(),
        };
        self.errors.push(FieldError::new(field, message));
    }

    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> CardioResult<T> {
        if !self.errors.is_empty() {
            return Err(CardioError::Validation(self.errors));
        }
        value().ok_or_else(|| CardioError::InvalidInput("form incomplete".into()))
    }
}

impl UserForm {
    /// Validates every field and returns the request body, or all field errors at once.
    pub fn validate(&self, mode: FormMode) -> CardioResult<UserPayload> {
        let mut c = Collector::default();

        let first_name = c.required("first_name", &self.first_name);
        let last_name = c.required("last_name", &self.last_name);
        let username = c.required("username", &self.username);

        let email = EmailAddress::parse(&self.email)
            .map_err(|e| c.text_error("email", e))
            .ok();
        let dni = Dni::parse(&self.dni).map_err(|e| c.text_error("dni", e)).ok();

        if let Some(age) = self.age {
            if let Err(e) = AgeBracket::from_age(age) {
                c.errors.push(FieldError::new("age", e.to_string()));
            }
        }

        let sex = match self.sex.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(token) => match SexCode::from_token(token) {
                Ok(code) => Some(code),
                Err(e) => {
                    c.errors.push(FieldError::new("sex", e.to_string()));
                    None
                }
            },
            None => None,
        };

        let password = match (mode, self.password.as_deref()) {
            (FormMode::Create, None) => {
                c.errors.push(FieldError::new("password", "is required"));
                None
            }
            (_, Some(p)) if p.chars().count() < MIN_PASSWORD_LEN => {
                c.errors.push(FieldError::new(
                    "password",
                    format!("must be at least {MIN_PASSWORD_LEN} characters"),
                ));
                None
            }
            (_, p) => p.map(str::to_string),
        };

        c.finish(|| {
            Some(UserPayload {
                first_name: first_name?,
                last_name: last_name?,
                username: username?,
                email: email?,
                dni: dni?,
                age: self.age,
                sex: sex.map(|s| s.token().to_string()),
                role_id: self.role_id,
                password,
            })
        })
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Both login fields are required; the email is sent as typed.
pub fn validate_login(email: &str, password: &str) -> CardioResult<Credentials> {
    let mut c = Collector::default();
    let email = c.required("email", email);
    if password.is_empty() {
        c.errors.push(FieldError::new("password", "is required"));
    }
    c.finish(|| {
        Some(Credentials {
            email: email?.to_string(),
            password: password.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> UserForm {
        UserForm {
            first_name: "Lucía".into(),
            last_name: "Mamani".into(),
            username: "lmamani".into(),
            email: "lucia@clinica.pe".into(),
            dni: "45678912".into(),
            age: Some(47),
            sex: Some("F".into()),
            role_id: Some(3),
            password: Some("s3cret-pass".into()),
        }
    }

    fn fields(err: CardioError) -> Vec<&'static str> {
        match err {
            CardioError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn complete_form_validates() {
        let payload = complete_form().validate(FormMode::Create).unwrap();
        assert_eq!(payload.dni.as_str(), "45678912");
        assert_eq!(payload.sex.as_deref(), Some("F"));
        assert_eq!(payload.password.as_deref(), Some("s3cret-pass"));
    }

    #[test]
    fn all_errors_are_reported_together() {
        let form = UserForm {
            email: "not-an-email".into(),
            dni: "123".into(),
            age: Some(12),
            sex: Some("X".into()),
            password: Some("short".into()),
            ..UserForm::default()
        };
        let err = form.validate(FormMode::Create).unwrap_err();
        assert_eq!(
            fields(err),
            ["first_name", "last_name", "username", "email", "dni", "age", "sex", "password"]
        );
    }

    #[test]
    fn password_only_required_on_create() {
        let mut form = complete_form();
        form.password = None;
        assert_eq!(fields(form.validate(FormMode::Create).unwrap_err()), ["password"]);
        assert!(form.validate(FormMode::Edit).unwrap().password.is_none());
    }

    #[test]
    fn login_requires_both_fields() {
        assert_eq!(
            fields(validate_login(" ", "").unwrap_err()),
            ["email", "password"]
        );
        let creds = validate_login("ana@clinica.pe", "pw").unwrap();
        assert_eq!(creds.email, "ana@clinica.pe");
    }
}
