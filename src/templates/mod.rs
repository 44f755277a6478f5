//! Built-in theme templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Autoescaping is on;
//! markup produced by the crate itself is passed through with `| safe`.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("more.html", include_str!("theme/more.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_item.html",
                include_str!("theme/partials/post_item.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub lang: String,
    /// Home URL, HTML-escaped
    pub root: String,
    /// Logo URL, HTML-escaped
    pub logo: String,
    pub generator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostItemData {
    pub slug: String,
    /// Detail page URL, HTML-escaped
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub author: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub title: String,
    /// Banner URL, HTML-escaped
    pub banner: Option<String>,
    pub date: String,
    pub author: String,
    pub reading_time: String,
    pub blocks: Vec<BlockData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: Option<String>,
    /// Rendered rich text
    pub html: String,
}
