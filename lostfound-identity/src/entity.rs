use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = lostfound::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            other => Err(lostfound::Error::Internal(anyhow::anyhow!(
                "unknown role: {other}"
            ))),
        }
    }
}

/// Roles a registration form may offer. `Admin` is only handed out by
/// someone who already is one.
pub fn available_roles(actor_is_admin: bool) -> Vec<Role> {
    if actor_is_admin {
        vec![Role::User, Role::Admin]
    } else {
        vec![Role::User]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub contact: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Row to insert for a new account.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub contact: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_names_round_trip() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(Role::try_from(role.to_string()).unwrap(), role);
        }
        assert!(Role::try_from("Moderator".to_string()).is_err());
    }

    #[test]
    fn test_admin_only_offered_to_admins() {
        assert_eq!(available_roles(false), vec![Role::User]);
        assert_eq!(available_roles(true), vec![Role::User, Role::Admin]);
    }
}
