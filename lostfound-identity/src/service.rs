use lostfound::Result;

use crate::entity::{Role, User};

/// Persistence collaborator of the registration workflow.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserService: Sync + Send {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// `Ok(false)` means the store declined the registration without an
    /// engine error.
    async fn register_user_with_role(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        contact: &str,
    ) -> Result<bool>;
}

mod user_service_impl;
pub use user_service_impl::*;
