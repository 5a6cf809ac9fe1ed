use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use crate::models::{PostInput, UserInput};
use crate::store::{posts, tags, users, StoreResult};

#[derive(Debug, Parser)]
#[command(name = "blogly", about = "Blog users, posts and tags", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server (the default).
    Serve,
    /// Replace every row with a small sample data set.
    Seed,
    /// Add a single user.
    CreateUser {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        image_url: Option<String>,
    },
}

/// Counts of rows inserted by [`seed`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Seeded {
    pub users: usize,
    pub posts: usize,
    pub tags: usize,
}

const SEED_USERS: &[(&str, &str)] = &[
    ("Alan", "Alda"),
    ("Joel", "Burton"),
    ("Jane", "Smith"),
];

const SEED_TAGS: &[&str] = &["Fun", "Even More", "Bloop", "Zope"];

/// (author index, title, content, tag indexes)
const SEED_POSTS: &[(usize, &str, &str, &[usize])] = &[
    (0, "First Post!", "Oh, hai.", &[0, 2]),
    (0, "Yet Another Post", "Nom nom nom.", &[1]),
    (1, "Flasks Have Been Clarified", "Fine print about Flask.", &[0, 1, 3]),
    (2, "Tomorrow", "Plans for tomorrow.", &[]),
];

/// Clears all tables, then inserts the sample users, tags and posts.
pub async fn seed(pool: &SqlitePool) -> StoreResult<Seeded> {
    let mut tx = pool.begin().await?;
    for table in ["posts_tags", "posts", "tags", "users"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let mut seeded = Seeded::default();

    let mut user_ids = Vec::new();
    for (first, last) in SEED_USERS {
        let user = users::create(pool, &UserInput::new(first, last, None)).await?;
        user_ids.push(user.id);
        seeded.users += 1;
    }

    let mut tag_ids = Vec::new();
    for name in SEED_TAGS {
        tag_ids.push(tags::create(pool, name).await?.id);
        seeded.tags += 1;
    }

    for (author, title, content, tag_indexes) in SEED_POSTS {
        let input = PostInput::new(title, content, tag_indexes.iter().map(|&i| tag_ids[i]));
        posts::create(pool, user_ids[*author], &input).await?;
        seeded.posts += 1;
    }

    tracing::info!(?seeded, "seeded database");
    Ok(seeded)
}

pub async fn create_user(
    pool: &SqlitePool,
    first_name: &str,
    last_name: &str,
    image_url: Option<&str>,
) -> StoreResult<()> {
    let user = users::create(pool, &UserInput::new(first_name, last_name, image_url)).await?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Name: {}", user.full_name());
    println!("  Image: {}", user.image_url);

    Ok(())
}
