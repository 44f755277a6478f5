//! Shaped post models handed to the views

use serde::Serialize;

use super::rich_text;
use crate::source::RichTextNode;

/// A post as shown in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    /// Unique slug, the rendering key
    pub slug: String,

    /// Publication date, already formatted for display
    pub first_publication_date: Option<String>,

    pub title: String,

    pub subtitle: String,

    pub author: String,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,

    /// Banner image URL
    pub banner: Option<String>,

    /// Body sections in order
    pub content: Vec<ContentBlock>,
}

/// A body section: optional heading plus rich text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: Option<String>,
    pub body: Vec<RichTextNode>,
}

impl ContentBlock {
    /// Plain text of the body
    pub fn text(&self) -> String {
        rich_text::as_text(&self.body)
    }

    /// Body rendered to HTML
    pub fn html(&self) -> String {
        rich_text::as_html(&self.body)
    }
}

/// One shaped page of the post list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    /// Cursor of the following page, `None` once the list is exhausted
    pub next_page: Option<String>,
    pub page: u32,
}
