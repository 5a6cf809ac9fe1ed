use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::FieldErrors;

const MAX_TITLE_LEN: usize = 80;
const MAX_CONTENT_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub user_id: i64,
}

impl Post {
    /// e.g. `Mon Jan 6 2025, 3:04 PM`. Falls back to the raw timestamp if it
    /// does not parse.
    pub fn friendly_date(&self) -> String {
        match self.created_at.parse::<DateTime<Utc>>() {
            Ok(created) => created.format("%a %b %-d %Y, %-I:%M %p").to_string(),
            Err(_) => self.created_at.clone(),
        }
    }
}

/// Fixed-width so that text ordering matches chronological ordering.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A post together with its author's display name, for listings that span
/// users.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author_id: i64,
    pub author_name: String,
}

/// Submitted fields for creating or replacing a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub tag_ids: BTreeSet<i64>,
}

impl PostInput {
    pub fn new(title: &str, content: &str, tag_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            tag_ids: tag_ids.into_iter().collect(),
        }
    }

    /// Builds an input from raw form pairs. `post-tag` (or `tags`) may repeat;
    /// values that are not integers are dropped.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut input = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => input.title = value,
                "content" => input.content = value,
                "post-tag" | "tags" => {
                    if let Ok(id) = value.trim().parse() {
                        input.tag_ids.insert(id);
                    }
                }
                _ => {}
            }
        }
        input
    }

    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            tag_ids: self.tag_ids.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.title.is_empty() {
            errors.insert("title".to_string(), "Title is required".to_string());
        } else if self.title.chars().count() > MAX_TITLE_LEN {
            errors.insert(
                "title".to_string(),
                format!("Title must be at most {MAX_TITLE_LEN} characters"),
            );
        }

        if self.content.is_empty() {
            errors.insert("content".to_string(), "Content is required".to_string());
        } else if self.content.chars().count() > MAX_CONTENT_LEN {
            errors.insert(
                "content".to_string(),
                format!("Content must be at most {MAX_CONTENT_LEN} characters"),
            );
        }

        errors
    }
}
