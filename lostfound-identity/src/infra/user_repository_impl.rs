use lostfound::db::{AppDbHandle, map_err};

use crate::entity::{NewUser, Role, User};

pub struct MySqlUserRepository;

#[async_trait::async_trait]
impl crate::repository::UserRepository for MySqlUserRepository {
    async fn find_by_email(
        &self,
        h: &mut AppDbHandle<'_>,
        email: &str,
    ) -> lostfound::Result<Option<User>> {
        sqlx::query_as(
            "SELECT u.user_id, u.name, u.email, u.contact, \
                    COALESCE(r.name, 'User') AS role, u.created_at \
             FROM users u \
             LEFT JOIN user_roles ur ON ur.user_id = u.user_id \
             LEFT JOIN roles r ON r.role_id = ur.role_id \
             WHERE u.email = ? \
             LIMIT 1",
        )
        .bind(email)
        .fetch_optional(h.conn().await?)
        .await
        .map_err(map_err)
    }

    async fn find_role_id(
        &self,
        h: &mut AppDbHandle<'_>,
        role: Role,
    ) -> lostfound::Result<Option<u32>> {
        sqlx::query_scalar("SELECT role_id FROM roles WHERE name = ?")
            .bind(role.as_str())
            .fetch_optional(h.conn().await?)
            .await
            .map_err(map_err)
    }

    async fn insert_user(
        &self,
        h: &mut AppDbHandle<'_>,
        user: NewUser<'_>,
    ) -> lostfound::Result<u64> {
        // TODO: hash the credential here once the deployment picks a scheme.
        let result = sqlx::query(
            "INSERT INTO users (name, email, password, contact) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .bind(user.contact)
        .execute(h.conn().await?)
        .await
        .map_err(map_err)?;
        Ok(result.last_insert_id())
    }

    async fn assign_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: u64,
        role_id: u32,
    ) -> lostfound::Result<()> {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(h.conn().await?)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lostfound::db::Handle;

    use super::*;
    use crate::repository::UserRepository;

    async fn setup_db() -> sqlx::MySqlPool {
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
    async fn test_insert_and_find_user() -> lostfound::Result<()> {
        let pool = setup_db().await;
        let repo = MySqlUserRepository;
        let mut pool_handle = Handle::Pool(pool.clone());
        let mut tx = pool_handle.begin().await?;

        let role_id = repo
            .find_role_id(&mut tx, Role::User)
            .await?
            .expect("roles are seeded");
        let user_id = repo
            .insert_user(
                &mut tx,
                NewUser {
                    name: "Repo Test",
                    email: "repo-test@lostfound.local",
                    password: "password1",
                    contact: "1234567890",
                },
            )
            .await?;
        repo.assign_role(&mut tx, user_id, role_id).await?;

        let found = repo
            .find_by_email(&mut tx, "repo-test@lostfound.local")
            .await?
            .expect("inserted user");
        assert_eq!(found.user_id, user_id);
        assert_eq!(found.role, Role::User);

        // 테스트 데이터는 남기지 않는다
        tx.rollback().await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_duplicate_email_reports_engine_text() -> lostfound::Result<()>
    {
        let pool = setup_db().await;
        let repo = MySqlUserRepository;
        let mut pool_handle = Handle::Pool(pool.clone());
        let mut tx = pool_handle.begin().await?;

        let user = NewUser {
            name: "Dup Test",
            email: "dup-test@lostfound.local",
            password: "password1",
            contact: "1234567890",
        };
        repo.insert_user(&mut tx, user).await?;
        let err = repo.insert_user(&mut tx, user).await.unwrap_err();

        let message = err.database_message().unwrap().to_lowercase();
        assert!(message.contains("duplicate entry"));
        assert!(message.contains("email"));

        tx.rollback().await?;
        Ok(())
    }
}
