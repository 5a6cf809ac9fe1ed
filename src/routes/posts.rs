use std::collections::BTreeSet;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use tower_sessions::Session;

use super::{redirect, reject_form, Layout};
use crate::error::AppError;
use crate::extract::Id;
use crate::flash;
use crate::models::{FieldErrors, Post, PostInput, Tag, User};
use crate::store::{posts, tags, users};
use crate::AppState;

#[derive(Template)]
#[template(path = "posts/show.html")]
struct PostShowTemplate {
    post: Post,
    author: User,
    tags: Vec<Tag>,
    layout: Layout,
}

#[derive(Template)]
#[template(path = "posts/form.html")]
struct PostFormTemplate {
    author: User,
    post: Option<Post>,
    title: String,
    content: String,
    tags: Vec<TagChoice>,
    errors: FieldErrors,
    layout: Layout,
}

/// A checkbox in the post form's tag list.
struct TagChoice {
    id: i64,
    name: String,
    checked: bool,
}

fn tag_choices(tags: Vec<Tag>, selected: &BTreeSet<i64>) -> Vec<TagChoice> {
    tags.into_iter()
        .map(|tag| TagChoice {
            checked: selected.contains(&tag.id),
            id: tag.id,
            name: tag.name,
        })
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/posts/new", get(new_post_form).post(create_post))
        .route("/posts/{id}", get(show_post))
        .route("/posts/{id}/edit", get(edit_post_form).post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
}

async fn new_post_form(
    State(state): State<AppState>,
    session: Session,
    Id(user_id): Id,
) -> Result<impl IntoResponse, AppError> {
    let author = users::get(&state.db, user_id).await?;
    let all_tags = tags::list(&state.db).await?;

    let template = PostFormTemplate {
        author,
        post: None,
        title: String::new(),
        content: String::new(),
        tags: tag_choices(all_tags, &BTreeSet::new()),
        errors: FieldErrors::new(),
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn create_post(
    State(state): State<AppState>,
    session: Session,
    Id(user_id): Id,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let input = PostInput::from_pairs(pairs);

    match posts::create(&state.db, user_id, &input).await {
        Ok(post) => {
            flash::success(&session, format!("Added \"{}\".", post.title)).await?;
            Ok(redirect(format!("/users/{user_id}")))
        }
        Err(e) => {
            let rejected = reject_form(&session, e).await?;
            let author = users::get(&state.db, user_id).await?;
            let all_tags = tags::list(&state.db).await?;

            let template = PostFormTemplate {
                author,
                post: None,
                tags: tag_choices(all_tags, &input.tag_ids),
                title: input.title,
                content: input.content,
                errors: rejected.errors,
                layout: rejected.layout,
            };
            Ok((rejected.status, Html(template.render()?)).into_response())
        }
    }
}

async fn show_post(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let post = posts::get(&state.db, id).await?;
    let author = users::get(&state.db, post.user_id).await?;
    let tags = posts::tags_for(&state.db, id).await?;

    let template = PostShowTemplate {
        post,
        author,
        tags,
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn edit_post_form(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let post = posts::get(&state.db, id).await?;
    let author = users::get(&state.db, post.user_id).await?;
    let selected = posts::tag_ids(&state.db, id).await?;
    let all_tags = tags::list(&state.db).await?;

    let template = PostFormTemplate {
        author,
        title: post.title.clone(),
        content: post.content.clone(),
        post: Some(post),
        tags: tag_choices(all_tags, &selected),
        errors: FieldErrors::new(),
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn update_post(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let post = posts::get(&state.db, id).await?;
    let input = PostInput::from_pairs(pairs);

    match posts::update(&state.db, id, &input).await {
        Ok(post) => {
            flash::success(&session, format!("Updated \"{}\".", post.title)).await?;
            Ok(redirect(format!("/posts/{id}")))
        }
        Err(e) => {
            let rejected = reject_form(&session, e).await?;
            let author = users::get(&state.db, post.user_id).await?;
            let all_tags = tags::list(&state.db).await?;

            let template = PostFormTemplate {
                author,
                post: Some(post),
                tags: tag_choices(all_tags, &input.tag_ids),
                title: input.title,
                content: input.content,
                errors: rejected.errors,
                layout: rejected.layout,
            };
            Ok((rejected.status, Html(template.render()?)).into_response())
        }
    }
}

async fn delete_post(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let post = posts::delete(&state.db, id).await?;

    flash::success(&session, format!("Deleted \"{}\".", post.title)).await?;
    Ok(redirect(format!("/users/{}", post.user_id)))
}
