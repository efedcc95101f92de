//! Publish settings and their local validation
//!
//! Validation runs before any store call; a rejected configuration never
//! reaches the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SEO_TITLE_MAX: usize = 60;
pub const SEO_DESCRIPTION_MAX: usize = 160;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PublishValidationError {
    #[error("Private pages require a password")]
    MissingPassword,

    #[error("Custom domain is enabled but no domain was given")]
    MissingCustomDomain,

    #[error("Invalid custom domain: {0}")]
    InvalidCustomDomain(String),

    #[error("Expiration date must be in the future")]
    ExpiryInPast,

    #[error("SEO title is {len} characters (max {max})")]
    SeoTitleTooLong { len: usize, max: usize },

    #[error("SEO description is {len} characters (max {max})")]
    SeoDescriptionTooLong { len: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

/// Configuration bag passed to publish
///
/// The password is never written to the store; only the fact that the page
/// is password protected is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishOptions {
    pub is_private: bool,
    #[serde(skip)]
    pub password: Option<String>,
    pub use_custom_domain: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<DateTime<Utc>>,
    pub seo: SeoFields,
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

impl PublishOptions {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), PublishValidationError> {
        if self.is_private {
            let has_password = self
                .password
                .as_deref()
                .map(|p| !p.trim().is_empty())
                .unwrap_or(false);
            if !has_password {
                return Err(PublishValidationError::MissingPassword);
            }
        }

        if self.use_custom_domain {
            let domain = self.custom_domain.as_deref().map(str::trim).unwrap_or("");
            if domain.is_empty() {
                return Err(PublishValidationError::MissingCustomDomain);
            }
            if !is_valid_domain(domain) {
                return Err(PublishValidationError::InvalidCustomDomain(domain.to_string()));
            }
        }

        if let Some(expiry) = self.expiration_date {
            if expiry <= now {
                return Err(PublishValidationError::ExpiryInPast);
            }
        }

        if let Some(title) = &self.seo.title {
            let len = title.chars().count();
            if len > SEO_TITLE_MAX {
                return Err(PublishValidationError::SeoTitleTooLong {
                    len,
                    max: SEO_TITLE_MAX,
                });
            }
        }

        if let Some(description) = &self.seo.description {
            let len = description.chars().count();
            if len > SEO_DESCRIPTION_MAX {
                return Err(PublishValidationError::SeoDescriptionTooLong {
                    len,
                    max: SEO_DESCRIPTION_MAX,
                });
            }
        }

        Ok(())
    }

    /// Public address of a page published with these options
    pub fn public_url(&self, base_url: &str, document_id: &str) -> String {
        match self.custom_domain.as_deref().map(str::trim) {
            Some(domain) if self.use_custom_domain && !domain.is_empty() => {
                format!("https://{}", domain)
            }
            _ => format!("{}/{}", base_url.trim_end_matches('/'), document_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PublishOptions::default().validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_private_without_password() {
        let options = PublishOptions {
            is_private: true,
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            options.validate(Utc::now()),
            Err(PublishValidationError::MissingPassword)
        );

        let options = PublishOptions {
            is_private: true,
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        assert!(options.validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_custom_domain_rules() {
        let missing = PublishOptions {
            use_custom_domain: true,
            custom_domain: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            missing.validate(Utc::now()),
            Err(PublishValidationError::MissingCustomDomain)
        );

        let invalid = PublishOptions {
            use_custom_domain: true,
            custom_domain: Some("not a domain".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            invalid.validate(Utc::now()),
            Err(PublishValidationError::InvalidCustomDomain(_))
        ));
    }

    #[test]
    fn test_expiry_in_past() {
        let now = Utc::now();
        let options = PublishOptions {
            expiration_date: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(
            options.validate(now),
            Err(PublishValidationError::ExpiryInPast)
        );
    }

    #[test]
    fn test_seo_limits() {
        let options = PublishOptions {
            seo: SeoFields {
                title: Some("x".repeat(61)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            options.validate(Utc::now()),
            Err(PublishValidationError::SeoTitleTooLong { len: 61, max: 60 })
        );
    }

    #[test]
    fn test_public_url() {
        let options = PublishOptions::default();
        assert_eq!(
            options.public_url("https://pages.example.com/", "page-1"),
            "https://pages.example.com/page-1"
        );

        let custom = PublishOptions {
            use_custom_domain: true,
            custom_domain: Some("launch.acme.io".to_string()),
            ..Default::default()
        };
        assert_eq!(
            custom.public_url("https://pages.example.com", "page-1"),
            "https://launch.acme.io"
        );
    }

    #[test]
    fn test_password_is_not_serialized() {
        let options = PublishOptions {
            is_private: true,
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"isPrivate\":true"));
    }
}
