//! Resolves authenticated callers to their user accounts.
use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::UserAccount,
    traits::{AccountApiError, AccountManagement},
};

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the account registered with `email`, which is the subject of the caller's access token.
    pub async fn user_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AccountApiError::QueryError("An e-mail address is required".into()));
        }
        let account = self.db.fetch_user_account_for_email(email).await?;
        trace!("Account lookup for {email}: {:?}", account.as_ref().map(|a| a.id));
        Ok(account)
    }
}
