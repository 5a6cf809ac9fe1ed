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
use crate::models::{FieldErrors, Post, User, UserInput};
use crate::store::{posts, users};
use crate::AppState;

#[derive(Template)]
#[template(path = "users/list.html")]
struct UserListTemplate {
    users: Vec<User>,
    layout: Layout,
}

#[derive(Template)]
#[template(path = "users/show.html")]
struct UserShowTemplate {
    user: User,
    posts: Vec<Post>,
    layout: Layout,
}

#[derive(Template)]
#[template(path = "users/form.html")]
struct UserFormTemplate {
    user: Option<User>,
    form: UserForm,
    errors: FieldErrors,
    layout: Layout,
}

#[derive(Deserialize, Default)]
pub struct UserForm {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    image_url: String,
}

impl UserForm {
    fn input(&self) -> UserInput {
        UserInput::new(&self.first_name, &self.last_name, Some(&self.image_url))
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            image_url: user.image_url.clone(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/new", get(new_user_form).post(create_user))
        .route("/users/{id}", get(show_user))
        .route("/users/{id}/edit", get(edit_user_form).post(update_user))
        .route("/users/{id}/delete", post(delete_user))
}

async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let template = UserListTemplate {
        users: users::list(&state.db).await?,
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn new_user_form(session: Session) -> Result<impl IntoResponse, AppError> {
    let template = UserFormTemplate {
        user: None,
        form: UserForm::default(),
        errors: FieldErrors::new(),
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn create_user(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    match users::create(&state.db, &form.input()).await {
        Ok(user) => {
            flash::success(&session, format!("Added {}.", user.full_name())).await?;
            Ok(redirect("/users"))
        }
        Err(e) => {
            let rejected = reject_form(&session, e).await?;
            let template = UserFormTemplate {
                user: None,
                form,
                errors: rejected.errors,
                layout: rejected.layout,
            };
            Ok((rejected.status, Html(template.render()?)).into_response())
        }
    }
}

async fn show_user(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get(&state.db, id).await?;
    let posts = posts::list_by_user(&state.db, id).await?;

    let template = UserShowTemplate {
        user,
        posts,
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn edit_user_form(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get(&state.db, id).await?;

    let template = UserFormTemplate {
        form: UserForm::from(&user),
        user: Some(user),
        errors: FieldErrors::new(),
        layout: Layout::from_session(&session).await?,
    };
    Ok(Html(template.render()?))
}

async fn update_user(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let user = users::get(&state.db, id).await?;

    match users::update(&state.db, id, &form.input()).await {
        Ok(user) => {
            flash::success(&session, format!("Updated {}.", user.full_name())).await?;
            Ok(redirect(format!("/users/{id}")))
        }
        Err(e) => {
            let rejected = reject_form(&session, e).await?;
            let template = UserFormTemplate {
                user: Some(user),
                form,
                errors: rejected.errors,
                layout: rejected.layout,
            };
            Ok((rejected.status, Html(template.render()?)).into_response())
        }
    }
}

async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Id(id): Id,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get(&state.db, id).await?;
    let removed = users::delete(&state.db, id).await?;

    let message = match removed {
        0 => format!("Deleted {}.", user.full_name()),
        1 => format!("Deleted {} and 1 post.", user.full_name()),
        n => format!("Deleted {} and {n} posts.", user.full_name()),
    };
    flash::success(&session, message).await?;
    Ok(redirect("/users"))
}
