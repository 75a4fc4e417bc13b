pub mod accounts;
pub mod handlers;
pub mod session;

use crate::auth::accounts::AccountError;
use crate::errors::AppError;
use crate::onboarding::form::Field;

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailInUse => AppError::Conflict {
                code: "EMAIL_IN_USE",
                field: Some(Field::Email),
                message: err.to_string(),
            },
            AccountError::Database(e) => AppError::Database(e),
        }
    }
}
