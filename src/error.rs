use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::models::FieldErrors;
use crate::routes::Layout;

/// Failures of the entity access layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid input: {0:?}")]
    Validation(FieldErrors),

    #[error("{message}")]
    Conflict { field: &'static str, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    /// The error as form messages, for re-rendering a submitted form.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            StoreError::Validation(errors) => Some(errors.clone()),
            StoreError::Conflict { field, message } => {
                Some(FieldErrors::from([(field.to_string(), message.clone())]))
            }
            _ => None,
        }
    }

    /// Status for a form re-rendered because of this error.
    pub fn form_status(&self) -> StatusCode {
        match self {
            StoreError::Conflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    Template(askama::Error),
    Session(tower_sessions::session::Error),
    Invalid(StoreError),
    NotFound,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    layout: Layout,
}

pub fn not_found_page() -> Response {
    let template = NotFoundTemplate {
        layout: Layout::default(),
    };
    match template.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template error: {e}");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => not_found_page(),
            AppError::Invalid(e) => {
                tracing::warn!("Rejected input: {e}");
                (e.form_status(), e.to_string()).into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => {
                tracing::debug!("{entity} {id} not found");
                AppError::NotFound
            }
            StoreError::Database(e) => AppError::Database(e),
            e @ (StoreError::Validation(_) | StoreError::Conflict { .. }) => AppError::Invalid(e),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e)
    }
}
