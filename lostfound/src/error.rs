use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("internal error: {0:#?}")]
    Internal(#[from] anyhow::Error),

    #[error("configuration error: {0:#?}")]
    Config(anyhow::Error),

    #[error("database error: {0}")]
    Database(anyhow::Error),

    #[error("a registration is already in progress")]
    SubmissionInFlight,

    #[error("registration already completed")]
    RegistrationClosed,

    #[error("role not offered: {0}")]
    RoleNotOffered(String),
}

impl Error {
    /// The text reported by the database engine, when the failure came from
    /// the database.
    pub fn database_message(&self) -> Option<String> {
        match self {
            Error::Database(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
