use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::FieldErrors;

const MAX_TAG_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_string()
    }

    pub fn validate_name(name: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if name.is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        } else if name.chars().count() > MAX_TAG_NAME_LEN {
            errors.insert(
                "name".to_string(),
                format!("Name must be at most {MAX_TAG_NAME_LEN} characters"),
            );
        }

        errors
    }
}

/// Membership of a tag on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PostTag {
    pub post_id: i64,
    pub tag_id: i64,
}

/// Join rows to insert and delete to move a post from one tag set to another.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub added: BTreeSet<i64>,
    pub removed: BTreeSet<i64>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn diff_tag_ids(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> TagDiff {
    TagDiff {
        added: desired.difference(current).copied().collect(),
        removed: current.difference(desired).copied().collect(),
    }
}
