use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::repo_types::{NewUser, User, UserError, UserProfile};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id              BIGSERIAL PRIMARY KEY,
        name            TEXT NOT NULL,
        email           TEXT NOT NULL UNIQUE,
        password        TEXT NOT NULL,
        profile_picture TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A taken email yields `DuplicateEmail`, never an overwrite.
    async fn create(&self, new: NewUser) -> Result<User, UserError>;
    /// Public projection, no password column.
    async fn find_by_id(&self, id: i64) -> Result<Option<UserProfile>, UserError>;
    /// Full row including the digest.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the `users` table if it does not exist yet. Safe to run on every boot.
    pub async fn sync_schema(&self) -> Result<(), UserError> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.db).await?;
        info!("users table synced");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> Result<User, UserError> {
        new.check_required()?;
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, profile_picture)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password, profile_picture, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.profile_picture) // Option<String> → NULL allowed
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let taken = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if taken {
                UserError::DuplicateEmail(new.email.clone())
            } else {
                UserError::Database(e)
            }
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserProfile>, UserError> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, name, email, profile_picture, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, profile_picture, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryUserStore;
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Grace".into(),
            email: email.into(),
            password_hash: "$argon2id$digest".into(),
            profile_picture: None,
        }
    }

    async fn exercise_store(store: &dyn UserStore, email: &str) {
        let created = store.create(new_user(email)).await.expect("create");
        assert_eq!(created.email, email);

        let dup = store.create(new_user(email)).await.unwrap_err();
        assert!(matches!(dup, UserError::DuplicateEmail(ref e) if e == email));

        let profile = store.find_by_id(created.id).await.unwrap().expect("by id");
        assert_eq!(profile.name, "Grace");
        assert_eq!(profile.email, email);

        let full = store.find_by_email(email).await.unwrap().expect("by email");
        assert_eq!(full.id, created.id);
        assert_eq!(full.password_hash, "$argon2id$digest");

        assert!(store.find_by_id(i64::MAX).await.unwrap().is_none());
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_enforces_unique_email() {
        let store = MemoryUserStore::default();
        exercise_store(&store, "grace@example.com").await;
        assert_eq!(store.count_with_email("grace@example.com"), 1);
    }

    #[tokio::test]
    async fn memory_store_rejects_missing_fields() {
        let store = MemoryUserStore::default();
        let mut nameless = new_user("x@example.com");
        nameless.name.clear();
        let err = store.create(nameless).await.unwrap_err();
        assert!(matches!(err, UserError::MissingField("name")));
        assert_eq!(store.count_with_email("x@example.com"), 0);
    }

    #[tokio::test]
    #[ignore = "needs a Postgres instance in DATABASE_URL"]
    async fn postgres_store_roundtrip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect");
        let store = PgUserStore::new(db);
        store.sync_schema().await.expect("sync");
        store.sync_schema().await.expect("sync is idempotent");

        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        exercise_store(&store, &email).await;
    }
}
