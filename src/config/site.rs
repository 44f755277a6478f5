//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono::Locale;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `api.endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable overriding `api.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,

    // URL
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    // Rendering
    /// Seconds between background re-renders of the post list
    pub revalidate: u64,
    /// Words per minute used by the reading time estimate
    pub reading_speed: usize,
    #[serde(default)]
    pub labels: LabelsConfig,

    // Content API
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt_BR".to_string(),
            timezone: "UTC".to_string(),
            date_format: "dd MMM yyyy".to_string(),

            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            revalidate: 60 * 60 * 24,
            reading_speed: 200,
            labels: LabelsConfig::default(),

            api: ApiConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_ENDPOINT).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using content API endpoint from environment");
            self.api.endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.api.access_token = Some(token);
        }
    }

    /// Locale used for date formatting, falling back to POSIX
    pub fn locale(&self) -> Locale {
        Locale::try_from(self.language.as_str()).unwrap_or_else(|_| {
            tracing::warn!("Unknown locale {:?}, using POSIX", self.language);
            Locale::POSIX
        })
    }

    /// Display timezone, falling back to UTC
    pub fn tz(&self) -> Tz {
        if self.timezone.trim().is_empty() {
            return Tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            Tz::UTC
        })
    }
}

/// Headless content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Repository API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: u32,
    pub order_field: String,
    pub order_direction: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 2,
            order_field: "document.first_publication_date".to_string(),
            order_direction: "desc".to_string(),
            timeout: 15,
        }
    }
}

/// User-facing labels; unset entries fall back to the built-in language table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub load_more: Option<String>,
    pub loading: Option<String>,
    pub home: Option<String>,
}
