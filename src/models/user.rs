use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;

use super::FieldErrors;

/// Shown for users created without a picture.
pub const DEFAULT_IMAGE_URL: &str =
    "https://www.freeiconspng.com/uploads/icon-user-blue-symbol-people-person-generic--public-domain--21.png";

const MAX_NAME_LEN: usize = 25;
const MAX_IMAGE_URL_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Submitted fields for creating or replacing a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
}

impl UserInput {
    pub fn new(first_name: &str, last_name: &str, image_url: Option<&str>) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            image_url: image_url.map(str::to_string),
        }
    }

    /// Trims every field and substitutes the default picture for a blank URL.
    pub fn normalized(&self) -> Self {
        let image_url = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_IMAGE_URL);

        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            image_url: Some(image_url.to_string()),
        }
    }

    /// Expects a normalized input.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        check_name(&mut errors, "first_name", "First name", &self.first_name);
        check_name(&mut errors, "last_name", "Last name", &self.last_name);

        if let Some(image_url) = self.image_url.as_deref() {
            if image_url.len() > MAX_IMAGE_URL_LEN {
                errors.insert(
                    "image_url".to_string(),
                    format!("Image URL must be under {MAX_IMAGE_URL_LEN} characters"),
                );
            } else if !is_web_url(image_url) {
                errors.insert(
                    "image_url".to_string(),
                    "Image URL must start with http:// or https://".to_string(),
                );
            }
        }

        errors
    }

    pub fn image_url_or_default(&self) -> &str {
        self.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL)
    }
}

fn check_name(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    if value.is_empty() {
        errors.insert(field.to_string(), format!("{label} is required"));
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.insert(
            field.to_string(),
            format!("{label} must be at most {MAX_NAME_LEN} characters"),
        );
    }
}

fn is_web_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_first_and_last() {
        let user = User {
            id: 1,
            first_name: "Alan".to_string(),
            last_name: "Alda".to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
        };
        assert_eq!(user.full_name(), "Alan Alda");
    }

    #[test]
    fn normalized_trims_and_defaults_image() {
        let input = UserInput::new("  Jane ", " Smith", Some("   ")).normalized();
        assert_eq!(input.first_name, "Jane");
        assert_eq!(input.last_name, "Smith");
        assert_eq!(input.image_url.as_deref(), Some(DEFAULT_IMAGE_URL));

        let input = UserInput::new("Jane", "Smith", None).normalized();
        assert_eq!(input.image_url_or_default(), DEFAULT_IMAGE_URL);
    }

    #[test]
    fn validate_requires_names() {
        let errors = UserInput::new(" ", "", None).normalized().validate();
        assert_eq!(errors.get("first_name").unwrap(), "First name is required");
        assert_eq!(errors.get("last_name").unwrap(), "Last name is required");
    }

    #[test]
    fn validate_rejects_long_names() {
        let long = "x".repeat(26);
        let errors = UserInput::new(&long, "Ok", None).normalized().validate();
        assert!(errors.contains_key("first_name"));
        assert!(!errors.contains_key("last_name"));
    }

    #[test]
    fn validate_checks_image_url_scheme() {
        let errors = UserInput::new("A", "B", Some("ftp://example.com/a.png"))
            .normalized()
            .validate();
        assert!(errors.contains_key("image_url"));

        let errors = UserInput::new("A", "B", Some("not a url"))
            .normalized()
            .validate();
        assert!(errors.contains_key("image_url"));

        let errors = UserInput::new("A", "B", Some("https://example.com/a.png"))
            .normalized()
            .validate();
        assert!(errors.is_empty());
    }
}
