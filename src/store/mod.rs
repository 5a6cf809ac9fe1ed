//! Entity access layer.
//!
//! Every function takes the storage handle explicitly and performs one atomic
//! read-modify-write. Writes that touch an entity and its join rows run in a
//! single transaction.

pub mod posts;
pub mod tags;
pub mod users;

use crate::error::StoreError;
use crate::models::FieldErrors;

pub type StoreResult<T> = Result<T, StoreError>;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

fn reject_invalid(errors: FieldErrors) -> StoreResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(errors))
    }
}
