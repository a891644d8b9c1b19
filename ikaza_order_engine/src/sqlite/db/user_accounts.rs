use sqlx::SqliteConnection;

use crate::{db_types::UserAccount, traits::AccountApiError};

pub async fn user_account_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, AccountApiError> {
    let account = sqlx::query_as("SELECT id, email, created_at FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

/// Creates a user with the given e-mail address, returning the existing account if the address is already registered.
/// Account sign-up lives outside this system, so this is only used to seed stores.
pub async fn fetch_or_create_account(email: &str, conn: &mut SqliteConnection) -> Result<UserAccount, AccountApiError> {
    if let Some(account) = user_account_by_email(email, conn).await? {
        return Ok(account);
    }
    let account = sqlx::query_as("INSERT INTO users (email) VALUES ($1) RETURNING id, email, created_at")
        .bind(email)
        .fetch_one(conn)
        .await?;
    Ok(account)
}
