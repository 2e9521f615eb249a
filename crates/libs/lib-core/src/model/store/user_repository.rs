//! # User Repository
//!
//! Provides database access layer for user-related operations.
//!
//! The chat core only ever reads users (identity resolution, receiver lookup,
//! projections for message payloads). Writes happen through the account
//! endpoints.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{UserRepository, memory_pool};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = memory_pool().await?;
//!
//! // Create a new user
//! let user = UserRepository::create(
//!     &pool,
//!     "alice",
//!     "alice@example.com",
//!     "hashed_password",
//!     "",
//! ).await?;
//!
//! // Find user by email
//! let found = UserRepository::find_by_email(&pool, "alice@example.com").await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

use super::models::User;
use super::{DbPool, UserId};
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by their email address.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching email
    /// * `Ok(None)` - No user found with that email
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by their username (case-sensitive).
    pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by primary key.
    ///
    /// Used by the identity verifier after a token decodes, and by the chat
    /// router to check that a receiver exists before persisting.
    pub async fn find_by_id(pool: &DbPool, id: UserId) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new user in the database.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Username already exists (UNIQUE constraint violation)
    /// - Email already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create(
        pool: &DbPool,
        username: &str,
        email: &str,
        password_hash: &str,
        avatar: &str,
    ) -> Result<User, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, avatar) VALUES (?, ?, ?, ?)"
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(avatar)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update the last login timestamp for a user.
    ///
    /// Updating a non-existent user affects zero rows and is not an error.
    pub async fn update_last_login(pool: &DbPool, id: UserId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// All active users other than `id`, ordered by username.
    pub async fn list_except(pool: &DbPool, id: UserId) -> Result<Vec<User>, sqlx::Error> {
        query_as::<_, User>(
            "SELECT * FROM users WHERE id <> ? AND is_active = 1 ORDER BY username ASC"
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }
}
