use crate::entity::{NewUser, Role, User};
use lostfound::db::AppDbHandle;

#[async_trait::async_trait]
pub trait UserRepository: Sync + Send {
    async fn find_by_email(
        &self,
        h: &mut AppDbHandle<'_>,
        email: &str,
    ) -> lostfound::Result<Option<User>>;

    async fn find_role_id(
        &self,
        h: &mut AppDbHandle<'_>,
        role: Role,
    ) -> lostfound::Result<Option<u32>>;

    /// Returns the generated `user_id`.
    async fn insert_user(
        &self,
        h: &mut AppDbHandle<'_>,
        user: NewUser<'_>,
    ) -> lostfound::Result<u64>;

    async fn assign_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: u64,
        role_id: u32,
    ) -> lostfound::Result<()>;
}
