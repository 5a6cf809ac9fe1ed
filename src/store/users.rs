use sqlx::SqlitePool;

use super::{reject_invalid, StoreResult};
use crate::error::StoreError;
use crate::models::{User, UserInput};

pub async fn list(db: &SqlitePool) -> StoreResult<Vec<User>> {
    let users = sqlx::query_as("SELECT * FROM users ORDER BY last_name, first_name, id")
        .fetch_all(db)
        .await?;
    Ok(users)
}

pub async fn count(db: &SqlitePool) -> StoreResult<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    Ok(count.0)
}

pub async fn get(db: &SqlitePool, id: i64) -> StoreResult<User> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::not_found("user", id))
}

pub async fn create(db: &SqlitePool, input: &UserInput) -> StoreResult<User> {
    let input = input.normalized();
    reject_invalid(input.validate())?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (first_name, last_name, image_url) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.image_url_or_default())
    .fetch_one(db)
    .await?;

    tracing::info!(user_id = user.id, "created user");
    Ok(user)
}

/// Replaces every field of the user.
pub async fn update(db: &SqlitePool, id: i64, input: &UserInput) -> StoreResult<User> {
    let input = input.normalized();
    reject_invalid(input.validate())?;

    sqlx::query_as(
        r#"
        UPDATE users
        SET first_name = ?, last_name = ?, image_url = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.image_url_or_default())
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(StoreError::not_found("user", id))
}

/// Deletes the user together with its posts and their tag memberships.
/// Returns the number of posts removed.
pub async fn delete(db: &SqlitePool, id: i64) -> StoreResult<u64> {
    let mut tx = db.begin().await?;

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(StoreError::not_found("user", id));
    }

    sqlx::query("DELETE FROM posts_tags WHERE post_id IN (SELECT id FROM posts WHERE user_id = ?)")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let posts = sqlx::query("DELETE FROM posts WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = id, posts, "deleted user");
    Ok(posts)
}
