use std::fmt;

use lostfound::Result;
use serde::Serialize;

use crate::entity::Role;
pub use crate::validator::Field;

pub const MSG_EMAIL_TAKEN: &str = "Email already registered";
pub const MSG_REGISTRATION_DECLINED: &str =
    "Registration failed. Please try again.";
pub const MSG_REGISTERED: &str = "Registration successful!\nYou can now login.";

/// One submission attempt, read from the form at submit time.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RegistrationRequest {
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("contact_number", &self.contact_number)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RegistrationOutcome {
    Success,
    ValidationFailure { field: Field, message: String },
    DuplicateEmail,
    PersistenceFailure { message: String },
}

impl RegistrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RegistrationOutcome::Success)
    }

    /// Text to put in front of the user.
    pub fn message(&self) -> &str {
        match self {
            RegistrationOutcome::Success => MSG_REGISTERED,
            RegistrationOutcome::ValidationFailure { message, .. } => message,
            RegistrationOutcome::DuplicateEmail => MSG_EMAIL_TAKEN,
            RegistrationOutcome::PersistenceFailure { message } => message,
        }
    }
}

// 업무, 시나리오 단위
#[async_trait::async_trait]
pub trait RegisterUserUseCase: Sync + Send {
    async fn execute(
        &self,
        req: RegistrationRequest,
    ) -> Result<RegistrationOutcome>;
}

mod register_user_usecase;
pub use register_user_usecase::*;
