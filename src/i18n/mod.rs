//! Internationalization (i18n) support for the user-facing labels

use serde::Serialize;

use crate::config::LabelsConfig;

/// Labels shown by the views
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    /// Button that loads the next page of posts
    pub load_more: String,
    /// Placeholder while a post is not resolved yet
    pub loading: String,
    /// Title of the list page
    pub home: String,
}

impl Labels {
    /// Built-in labels for a language, English for anything unknown
    pub fn for_language(language: &str) -> Self {
        let lang = language
            .split(['_', '-'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match lang.as_str() {
            "pt" => Self {
                load_more: "Carregar mais posts".to_string(),
                loading: "Carregando...".to_string(),
                home: "Home".to_string(),
            },
            "es" => Self {
                load_more: "Cargar más posts".to_string(),
                loading: "Cargando...".to_string(),
                home: "Inicio".to_string(),
            },
            _ => Self {
                load_more: "Load more posts".to_string(),
                loading: "Loading...".to_string(),
                home: "Home".to_string(),
            },
        }
    }

    /// Built-in labels with configured overrides applied
    pub fn resolve(language: &str, overrides: &LabelsConfig) -> Self {
        let mut labels = Self::for_language(language);
        if let Some(v) = &overrides.load_more {
            labels.load_more = v.clone();
        }
        if let Some(v) = &overrides.loading {
            labels.loading = v.clone();
        }
        if let Some(v) = &overrides.home {
            labels.home = v.clone();
        }
        labels
    }
}
