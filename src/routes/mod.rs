pub mod home;
pub mod posts;
pub mod tags;
pub mod users;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;

use crate::error::{AppError, StoreError};
use crate::flash::{self, Flash};
use crate::models::FieldErrors;

/// Page chrome shared by every template through `base.html`.
pub struct Layout {
    pub flashes: Vec<Flash>,
    pub static_hash: &'static str,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            flashes: Vec::new(),
            static_hash: crate::STATIC_HASH,
        }
    }
}

impl Layout {
    /// Consumes the session's pending flash messages.
    pub async fn from_session(session: &Session) -> Result<Self, AppError> {
        Ok(Self {
            flashes: flash::take(session).await?,
            ..Self::default()
        })
    }
}

/// `302 Found` to `uri`.
pub fn redirect(uri: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, uri.into())]).into_response()
}

/// What a rejected form is re-rendered with.
pub struct Rejected {
    pub status: StatusCode,
    pub errors: FieldErrors,
    pub layout: Layout,
}

/// Input errors become a [`Rejected`] form carrying an error flash. Anything
/// else is returned as the handler's error.
pub async fn reject_form(session: &Session, e: StoreError) -> Result<Rejected, AppError> {
    let e = match AppError::from(e) {
        AppError::Invalid(e) => e,
        other => return Err(other),
    };
    flash::error(session, "Please fix the errors below.").await?;

    Ok(Rejected {
        status: e.form_status(),
        errors: e.field_errors().unwrap_or_default(),
        layout: Layout::from_session(session).await?,
    })
}
