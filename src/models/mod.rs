pub mod post;
pub mod tag;
pub mod user;

pub use post::{Post, PostInput, PostSummary};
pub use tag::{PostTag, Tag, TagDiff};
pub use user::{User, UserInput, DEFAULT_IMAGE_URL};

use std::collections::HashMap;

/// Field name to message, as shown next to form inputs.
pub type FieldErrors = HashMap<String, String>;
