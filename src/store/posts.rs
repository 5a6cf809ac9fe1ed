use std::collections::BTreeSet;

use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::{reject_invalid, StoreResult};
use crate::error::StoreError;
use crate::models::post::timestamp_now;
use crate::models::tag::diff_tag_ids;
use crate::models::{Post, PostInput, PostSummary, PostTag, Tag};

/// Post joined with its author's name.
#[derive(FromRow)]
struct PostWithAuthor {
    id: i64,
    title: String,
    content: String,
    created_at: String,
    user_id: i64,
    first_name: String,
    last_name: String,
}

impl From<PostWithAuthor> for PostSummary {
    fn from(row: PostWithAuthor) -> Self {
        PostSummary {
            author_id: row.user_id,
            author_name: format!("{} {}", row.first_name, row.last_name),
            post: Post {
                id: row.id,
                title: row.title,
                content: row.content,
                created_at: row.created_at,
                user_id: row.user_id,
            },
        }
    }
}

pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> StoreResult<Vec<Post>> {
    let posts = sqlx::query_as(
        "SELECT * FROM posts WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(posts)
}

/// The newest posts across all users, at most `limit` of them.
pub async fn list_recent(db: &SqlitePool, limit: i64) -> StoreResult<Vec<PostSummary>> {
    if limit <= 0 {
        return Ok(Vec::new());
    }

    let rows: Vec<PostWithAuthor> = sqlx::query_as(
        r#"
        SELECT p.*, u.first_name, u.last_name
        FROM posts p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(PostSummary::from).collect())
}

pub async fn get(db: &SqlitePool, id: i64) -> StoreResult<Post> {
    sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::not_found("post", id))
}

/// Tags of the post, by name.
pub async fn tags_for(db: &SqlitePool, post_id: i64) -> StoreResult<Vec<Tag>> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.* FROM tags t
        JOIN posts_tags pt ON pt.tag_id = t.id
        WHERE pt.post_id = ?
        ORDER BY t.name, t.id
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await?;
    Ok(tags)
}

pub async fn tag_ids(db: &SqlitePool, post_id: i64) -> StoreResult<BTreeSet<i64>> {
    let mut conn = db.acquire().await?;
    Ok(current_tag_ids(&mut conn, post_id).await?)
}

async fn current_tag_ids(
    conn: &mut SqliteConnection,
    post_id: i64,
) -> Result<BTreeSet<i64>, sqlx::Error> {
    let rows: Vec<PostTag> = sqlx::query_as("SELECT * FROM posts_tags WHERE post_id = ?")
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(|row| row.tag_id).collect())
}

/// Inserts a membership row for every id that names an existing tag. Unknown
/// ids are skipped. Returns how many rows were inserted.
async fn attach_tags(
    conn: &mut SqliteConnection,
    post_id: i64,
    tag_ids: &BTreeSet<i64>,
) -> Result<u64, sqlx::Error> {
    let mut attached = 0;
    for &tag_id in tag_ids {
        attached += sqlx::query(
            "INSERT OR IGNORE INTO posts_tags (post_id, tag_id) SELECT ?, id FROM tags WHERE id = ?",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(attached)
}

async fn detach_tags(
    conn: &mut SqliteConnection,
    post_id: i64,
    tag_ids: &BTreeSet<i64>,
) -> Result<(), sqlx::Error> {
    for &tag_id in tag_ids {
        sqlx::query("DELETE FROM posts_tags WHERE post_id = ? AND tag_id = ?")
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create(db: &SqlitePool, user_id: i64, input: &PostInput) -> StoreResult<Post> {
    let input = input.normalized();
    reject_invalid(input.validate())?;

    let mut tx = db.begin().await?;

    let author: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if author.is_none() {
        return Err(StoreError::not_found("user", user_id));
    }

    let post: Post = sqlx::query_as(
        "INSERT INTO posts (title, content, created_at, user_id) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(timestamp_now())
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let tags = attach_tags(&mut tx, post.id, &input.tag_ids).await?;

    tx.commit().await?;

    tracing::info!(post_id = post.id, user_id, tags, "created post");
    Ok(post)
}

/// Replaces title and content, and moves the tag set to exactly the given
/// ids (minus any that do not exist).
pub async fn update(db: &SqlitePool, id: i64, input: &PostInput) -> StoreResult<Post> {
    let input = input.normalized();
    reject_invalid(input.validate())?;

    let mut tx = db.begin().await?;

    let post: Post = sqlx::query_as(
        "UPDATE posts SET title = ?, content = ? WHERE id = ? RETURNING *",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(StoreError::not_found("post", id))?;

    let current = current_tag_ids(&mut tx, id).await?;
    let diff = diff_tag_ids(&current, &input.tag_ids);
    if !diff.is_empty() {
        detach_tags(&mut tx, id, &diff.removed).await?;
        attach_tags(&mut tx, id, &diff.added).await?;
    }

    tx.commit().await?;

    tracing::info!(
        post_id = id,
        added = diff.added.len(),
        removed = diff.removed.len(),
        "updated post"
    );
    Ok(post)
}

/// Removes the post and its memberships. Tags are left in place.
pub async fn delete(db: &SqlitePool, id: i64) -> StoreResult<Post> {
    let mut tx = db.begin().await?;

    let post: Post = sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::not_found("post", id))?;

    sqlx::query("DELETE FROM posts_tags WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(post_id = id, user_id = post.user_id, "deleted post");
    Ok(post)
}
