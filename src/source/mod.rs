//! Content source - the remote headless content API
//!
//! The rest of the crate only talks to [`ContentSource`]; a concrete client
//! is constructed once and passed in where it is needed.

#[cfg(test)]
pub(crate) mod memory;
mod prismic;
mod record;

use async_trait::async_trait;
use thiserror::Error;

pub use prismic::PrismicClient;
pub use record::{
    ApiInfo, ApiRef, Embed, ImageField, NodeKind, Record, RecordBlock, RecordData, RichTextNode,
    SearchResponse, Span, SpanData, SpanKind,
};

use crate::config::ApiConfig;

/// Errors raised by a content source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("content source unavailable: {0}")]
    Unavailable(String),

    #[error("no post with slug `{0}`")]
    NotFound(String),

    #[error("failed to decode content API response: {0}")]
    Decode(String),

    #[error("cursor does not belong to the configured content API: {0}")]
    InvalidCursor(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// Result ordering for list queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

impl Ordering {
    /// Render as the API's `orderings` parameter, e.g. `[document.first_publication_date desc]`
    pub fn to_query(&self) -> String {
        match self.direction {
            Direction::Asc => format!("[{}]", self.field),
            Direction::Desc => format!("[{} desc]", self.field),
        }
    }
}

impl Default for Ordering {
    fn default() -> Self {
        Self {
            field: "document.first_publication_date".to_string(),
            direction: Direction::Desc,
        }
    }
}

/// Parameters of a paged list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub ordering: Ordering,
}

impl ListQuery {
    /// First page of the list as configured
    pub fn from_config(config: &ApiConfig) -> Self {
        let direction = if config.order_direction.eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else {
            Direction::Desc
        };
        Self {
            page: 1,
            page_size: config.page_size.max(1),
            ordering: Ordering {
                field: config.order_field.clone(),
                direction,
            },
        }
    }
}

/// Access to post records
///
/// Every call is a single best-effort request: no retries, no caching.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Query posts by type with ordering and paging
    async fn list_posts(&self, query: &ListQuery) -> SourceResult<SearchResponse>;

    /// Follow a `next_page` cursor returned by a previous query
    async fn fetch_page(&self, cursor: &str) -> SourceResult<SearchResponse>;

    /// Look up a post by its unique slug
    async fn get_post_by_slug(&self, slug: &str) -> SourceResult<Record>;

    /// Walk every page of the list and collect the slugs in list order
    async fn all_slugs(&self, query: &ListQuery) -> SourceResult<Vec<String>> {
        let mut slugs = Vec::new();
        let mut response = self.list_posts(query).await?;
        loop {
            slugs.extend(response.results.iter().filter_map(|r| r.uid.clone()));
            match response.next_page.take() {
                Some(cursor) => response = self.fetch_page(&cursor).await?,
                None => break,
            }
        }
        Ok(slugs)
    }
}
