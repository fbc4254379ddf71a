//! # Profile Repository
//!
//! User accounts. Passwords arrive already hashed; hashing lives in the
//! HTTP layer next to token issuing.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use adega_core::Profile;

const PROFILE_COLUMNS: &str = "id, name, email, password_hash, created_at";

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Registers a profile.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` on `email` when it is already registered
    /// (case-insensitive).
    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> DbResult<Profile> {
        let profile = Profile {
            id: new_id(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %profile.id, "Creating profile");

        sqlx::query(
            "INSERT INTO profiles (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.password_hash)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &profile.email),
            other => other,
        })?;

        Ok(profile)
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::repository::testing::setup;

    #[tokio::test]
    async fn test_email_is_unique_ignoring_case() {
        let (db, _ctx) = setup().await;

        let err = db
            .profiles()
            .create("Other Ana", "ANA@adega.test", "$argon2id$hash")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));

        let found = db.profiles().find_by_email("Ana@Adega.test").await.unwrap();
        assert_eq!(found.unwrap().name, "Ana Souza");
    }
}
