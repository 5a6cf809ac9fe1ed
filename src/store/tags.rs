use sqlx::SqlitePool;

use super::{is_unique_violation, reject_invalid, StoreResult};
use crate::error::StoreError;
use crate::models::{Post, Tag};

fn duplicate(name: &str) -> StoreError {
    StoreError::Conflict {
        field: "name",
        message: format!("A tag named \"{name}\" already exists"),
    }
}

pub async fn list(db: &SqlitePool) -> StoreResult<Vec<Tag>> {
    let tags = sqlx::query_as("SELECT * FROM tags ORDER BY name, id")
        .fetch_all(db)
        .await?;
    Ok(tags)
}

pub async fn count(db: &SqlitePool) -> StoreResult<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
        .fetch_one(db)
        .await?;
    Ok(count.0)
}

pub async fn get(db: &SqlitePool, id: i64) -> StoreResult<Tag> {
    sqlx::query_as("SELECT * FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::not_found("tag", id))
}

pub async fn create(db: &SqlitePool, name: &str) -> StoreResult<Tag> {
    let name = Tag::normalize_name(name);
    reject_invalid(Tag::validate_name(&name))?;

    let tag: Tag = sqlx::query_as("INSERT INTO tags (name) VALUES (?) RETURNING *")
        .bind(&name)
        .fetch_one(db)
        .await
        .map_err(|e| if is_unique_violation(&e) { duplicate(&name) } else { e.into() })?;

    tracing::info!(tag_id = tag.id, name = %tag.name, "created tag");
    Ok(tag)
}

pub async fn update(db: &SqlitePool, id: i64, name: &str) -> StoreResult<Tag> {
    let name = Tag::normalize_name(name);
    reject_invalid(Tag::validate_name(&name))?;

    sqlx::query_as("UPDATE tags SET name = ? WHERE id = ? RETURNING *")
        .bind(&name)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| if is_unique_violation(&e) { duplicate(&name) } else { e.into() })?
        .ok_or(StoreError::not_found("tag", id))
}

/// Removes the tag and its memberships. Posts are left in place.
pub async fn delete(db: &SqlitePool, id: i64) -> StoreResult<()> {
    let mut tx = db.begin().await?;

    let detached = sqlx::query("DELETE FROM posts_tags WHERE tag_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(StoreError::not_found("tag", id));
    }

    tx.commit().await?;

    tracing::info!(tag_id = id, detached, "deleted tag");
    Ok(())
}

/// Posts carrying the tag, newest first.
pub async fn posts_for(db: &SqlitePool, tag_id: i64) -> StoreResult<Vec<Post>> {
    let posts = sqlx::query_as(
        r#"
        SELECT p.* FROM posts p
        JOIN posts_tags pt ON pt.post_id = p.id
        WHERE pt.tag_id = ?
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(tag_id)
    .fetch_all(db)
    .await?;
    Ok(posts)
}
