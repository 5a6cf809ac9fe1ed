use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use blogly::cli::{self, Cli, Command};
use blogly::config::Config;
use blogly::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blogly=info,tower_http=info")),
        )
        .init();

    let args = Cli::parse();
    let config = Config::from_env();

    let pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("connecting to {}", config.database_url))?;
    db::migrate(&pool).await.context("running migrations")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = blogly::build_app(pool, config.secure_cookies)
                .await
                .context("setting up session store")?;

            let addr = config.addr();
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding {addr}"))?;

            tracing::info!("listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Command::Seed => {
            let seeded = cli::seed(&pool).await?;
            println!(
                "Seeded {} users, {} posts, {} tags",
                seeded.users, seeded.posts, seeded.tags
            );
        }
        Command::CreateUser {
            first_name,
            last_name,
            image_url,
        } => {
            cli::create_user(&pool, &first_name, &last_name, image_url.as_deref()).await?;
        }
    }

    Ok(())
}
