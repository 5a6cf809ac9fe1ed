use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const FLASH_KEY: &str = "flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Success => write!(f, "success"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// A message shown once, on the next page rendered for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

pub async fn push(
    session: &Session,
    level: Level,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut flashes: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    flashes.push(Flash {
        level,
        message: message.into(),
    });
    session.insert(FLASH_KEY, flashes).await
}

pub async fn success(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, Level::Success, message).await
}

pub async fn error(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, Level::Error, message).await
}

/// Pops every pending message.
pub async fn take(session: &Session) -> Result<Vec<Flash>, tower_sessions::session::Error> {
    let pending: Option<Vec<Flash>> = session.get(FLASH_KEY).await?;
    if pending.is_none() {
        return Ok(Vec::new());
    }
    let flashes: Option<Vec<Flash>> = session.remove(FLASH_KEY).await?;
    Ok(flashes.unwrap_or_default())
}
