use thiserror::Error;

use crate::db_types::UserAccount;

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Read access to user accounts. Accounts are created elsewhere; the order backend only needs to map the identity in
/// an access token to the account id that owns orders.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user account registered with the given e-mail address. The match is exact.
    async fn fetch_user_account_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;
}
