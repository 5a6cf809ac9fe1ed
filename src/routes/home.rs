use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{redirect, Layout};
use crate::error::AppError;
use crate::models::PostSummary;
use crate::store::posts;
use crate::AppState;

pub const RECENT_POSTS_DEFAULT: i64 = 5;
pub const RECENT_POSTS_MAX: i64 = 50;

#[derive(Template)]
#[template(path = "posts/recent.html")]
struct RecentPostsTemplate {
    posts: Vec<PostSummary>,
    layout: Layout,
}

#[derive(Deserialize)]
pub struct RecentQuery {
    limit: Option<String>,
}

impl RecentQuery {
    /// Unparseable values fall back to the default.
    fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(RECENT_POSTS_DEFAULT)
            .clamp(1, RECENT_POSTS_MAX)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/posts", get(recent_posts))
}

async fn index() -> impl IntoResponse {
    redirect("/posts")
}

async fn recent_posts(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let template = RecentPostsTemplate {
        posts: posts::list_recent(&state.db, query.limit()).await?,
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}
