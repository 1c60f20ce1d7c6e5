//! Field checks shared by live (per keystroke) validation and submission.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const CONTACT_DIGITS: usize = 10;

pub const MSG_REQUIRED: &str = "All fields are required";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_INVALID_CONTACT: &str = "Contact number must be 10 digits";
pub const MSG_SHORT_PASSWORD: &str = "Password must be at least 8 characters";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Input fields of the registration form, in submission check order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Field {
    FullName,
    Email,
    ContactNumber,
    Password,
    ConfirmPassword,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FullName,
        Field::Email,
        Field::ContactNumber,
        Field::Password,
        Field::ConfirmPassword,
    ];

    /// Password fields are taken verbatim, everything else is trimmed.
    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValidationState {
    Neutral,
    Focused,
    Valid,
    Invalid,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,6}$")
            .unwrap_or_else(|e| panic!("email regex failed to compile: {e}"))
    })
}

pub fn is_valid_email(s: &str) -> bool {
    email_regex().is_match(s)
}

pub fn is_valid_contact(s: &str) -> bool {
    s.len() == CONTACT_DIGITS && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_strong_enough_password(s: &str) -> bool {
    s.chars().count() >= MIN_PASSWORD_LEN
}

pub fn passwords_match(password: &str, confirm: &str) -> bool {
    password == confirm
}

/// Live state of one field. An empty field never shows as invalid; the
/// submit path rejects it instead. `password` is only read for
/// [`Field::ConfirmPassword`].
pub fn validate_field(
    field: Field,
    value: &str,
    is_focused: bool,
    password: &str,
) -> FieldValidationState {
    let valid = value.is_empty()
        || match field {
            Field::FullName => true,
            Field::Email => is_valid_email(value),
            Field::ContactNumber => is_valid_contact(value),
            Field::Password => is_strong_enough_password(value),
            Field::ConfirmPassword => passwords_match(password, value),
        };

    if !valid {
        FieldValidationState::Invalid
    } else if is_focused {
        FieldValidationState::Focused
    } else if value.is_empty() {
        FieldValidationState::Neutral
    } else {
        FieldValidationState::Valid
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Submission-time check. The first failing rule wins: any empty field
/// (in [`Field::ALL`] order), then email, contact, password length and
/// finally the confirmation.
pub fn validate_submission(
    full_name: &str,
    email: &str,
    contact: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), FieldError> {
    let values = [full_name, email, contact, password, confirm_password];
    if let Some((field, _)) =
        Field::ALL.iter().zip(values).find(|(_, v)| v.is_empty())
    {
        return Err(FieldError::new(*field, MSG_REQUIRED));
    }
    if !is_valid_email(email) {
        return Err(FieldError::new(Field::Email, MSG_INVALID_EMAIL));
    }
    if !is_valid_contact(contact) {
        return Err(FieldError::new(Field::ContactNumber, MSG_INVALID_CONTACT));
    }
    if !is_strong_enough_password(password) {
        return Err(FieldError::new(Field::Password, MSG_SHORT_PASSWORD));
    }
    if !passwords_match(password, confirm_password) {
        return Err(FieldError::new(
            Field::ConfirmPassword,
            MSG_PASSWORD_MISMATCH,
        ));
    }
    Ok(())
}
