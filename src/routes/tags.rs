use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{redirect, reject_form, Layout};
use crate::error::AppError;
use crate::extract::Id;
use crate::flash;
use crate::models::{FieldErrors, Post, Tag};
use crate::store::tags;
use crate::AppState;

#[derive(Template)]
#[template(path = "tags/list.html")]
struct TagListTemplate {
    tags: Vec<Tag>,
    layout: Layout,
}

#[derive(Template)]
#[template(path = "tags/show.html")]
struct TagShowTemplate {
    tag: Tag,
    posts: Vec<Post>,
    layout: Layout,
}

#[derive(Template)]
#[template(path = "tags/form.html")]
struct TagFormTemplate {
    tag: Option<Tag>,
    name: String,
    errors: FieldErrors,
    layout: Layout,
}

#[derive(Deserialize)]
pub struct TagForm {
    #[serde(default)]
    name: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tags/new", get(new_tag_form).post(create_tag))
        .route("/tags/{id}", get(show_tag))
        .route("/tags/{id}/edit", get(edit_tag_form).post(update_tag))
        .route("/tags/{id}/delete", post(delete_tag))
}

async fn list_tags(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let template = TagListTemplate {
        tags: tags::list(&state.db).await?,
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn new_tag_form(session: Session) -> Result<impl IntoResponse, AppError> {
    let template = TagFormTemplate {
        tag: None,
        name: String::new(),
        errors: FieldErrors::new(),
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn create_tag(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<TagForm>,
) -> Result<Response, AppError> {
    match tags::create(&state.db, &form.name).await {
        Ok(tag) => {
            flash::success(&session, format!("Added tag \"{}\".", tag.name)).await?;
            Ok(redirect("/tags"))
        }
        Err(e) => {
            let rejected = reject_form(&session, e).await?;
            let template = TagFormTemplate {
                tag: None,
                name: form.name,
                errors: rejected.errors,
                layout: rejected.layout,
            };
            Ok((rejected.status, Html(template.render()?)).into_response())
        }
    }
}

async fn show_tag(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let tag = tags::get(&state.db, id).await?;
    let posts = tags::posts_for(&state.db, id).await?;

    let template = TagShowTemplate {
        tag,
        posts,
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn edit_tag_form(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let tag = tags::get(&state.db, id).await?;

    let template = TagFormTemplate {
        name: tag.name.clone(),
        tag: Some(tag),
        errors: FieldErrors::new(),
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn update_tag(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
    Form(form): Form<TagForm>,
) -> Result<Response, AppError> {
    let tag = tags::get(&state.db, id).await?;

    match tags::update(&state.db, id, &form.name).await {
        Ok(tag) => {
            flash::success(&session, format!("Renamed tag to \"{}\".", tag.name)).await?;
            Ok(redirect(format!("/tags/{id}")))
        }
        Err(e) => {
            let rejected = reject_form(&session, e).await?;
            let template = TagFormTemplate {
                tag: Some(tag),
                name: form.name,
                errors: rejected.errors,
                layout: rejected.layout,
            };
            Ok((rejected.status, Html(template.render()?)).into_response())
        }
    }
}

async fn delete_tag(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let tag = tags::get(&state.db, id).await?;
    tags::delete(&state.db, id).await?;

    flash::success(&session, format!("Deleted tag \"{}\".", tag.name)).await?;
    Ok(redirect("/tags"))
}
