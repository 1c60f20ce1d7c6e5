use std::sync::Arc;

use lostfound::db::{AppDbPool, Handle};

use crate::{
    entity::{NewUser, Role, User},
    repository::UserRepository,
    service::UserService,
};

pub struct DefaultUserService<R: UserRepository> {
    pub pool: AppDbPool,
    pub repo: Arc<R>,
}

impl<R: UserRepository> DefaultUserService<R> {
    pub fn new(pool: AppDbPool, repo: Arc<R>) -> Self {
        Self { pool, repo }
    }
}

#[async_trait::async_trait]
impl<R: UserRepository> UserService for DefaultUserService<R> {
    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> lostfound::Result<Option<User>> {
        let mut handle = Handle::Pool(self.pool.clone());
        self.repo.find_by_email(&mut handle, email).await
    }

    async fn register_user_with_role(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        contact: &str,
    ) -> lostfound::Result<bool> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        let role_id = self.repo.find_role_id(&mut tx, role).await?;
        let Some(role_id) = role_id else {
            tracing::warn!(%role, "role is not provisioned in the store");
            tx.rollback().await?;
            return Ok(false);
        };

        let user = NewUser {
            name,
            email,
            password,
            contact,
        };
        // 실패 시 tx 가 drop 되면서 rollback 된다
        let user_id = self.repo.insert_user(&mut tx, user).await?;
        self.repo.assign_role(&mut tx, user_id, role_id).await?;
        tx.commit().await?;

        tracing::debug!(user_id, %role, "user row committed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MySqlUserRepository;

    async fn setup_db() -> AppDbPool {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for mysql test");
        let pool = sqlx::MySqlPool::connect(&url)
            .await
            .expect("Failed to connect to MySQL");
        sqlx::raw_sql(include_str!("../../schema/mysql.sql"))
            .execute(&pool)
            .await
            .expect("Failed to apply schema");
        pool
    }

    #[tokio::test]
    #[ignore]
    async fn test_register_then_find() -> lostfound::Result<()> {
        let pool = setup_db().await;
        let repo = Arc::new(MySqlUserRepository);
        let service = DefaultUserService::new(pool.clone(), repo);
        let email = "service-test@lostfound.local";

        sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&pool)
            .await
            .map_err(lostfound::db::map_err)?;

        assert!(service.find_user_by_email(email).await?.is_none());

        let registered = service
            .register_user_with_role(
                "Service Test",
                email,
                "password1",
                Role::Admin,
                "0123456789",
            )
            .await?;
        assert!(registered);

        let user = service.find_user_by_email(email).await?.unwrap();
        assert_eq!(user.name, "Service Test");
        assert_eq!(user.role, Role::Admin);

        // 같은 email 로 다시 등록하면 엔진 에러가 그대로 올라온다
        let err = service
            .register_user_with_role(
                "Service Test",
                email,
                "password1",
                Role::User,
                "0123456789",
            )
            .await
            .unwrap_err();
        assert!(err.database_message().is_some());

        sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&pool)
            .await
            .map_err(lostfound::db::map_err)?;
        Ok(())
    }
}
