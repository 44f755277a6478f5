//! Incremental "load more" pagination of the post list

use std::collections::HashSet;

use crate::content::{PageShaper, PostPage, PostSummary};
use crate::source::{ContentSource, SourceResult};

/// Accumulated list state driven by "load more" triggers
///
/// `load_more` borrows the controller mutably, so a second trigger cannot
/// start while the first fetch is still outstanding.
#[derive(Debug, Clone)]
pub struct PaginationController {
    posts: Vec<PostSummary>,
    slugs: HashSet<String>,
    next_page: Option<String>,
    current_page: u32,
    shaper: PageShaper,
}

impl PaginationController {
    /// Start from the first shaped page
    pub fn new(initial: PostPage, shaper: PageShaper) -> Self {
        let mut controller = Self {
            posts: Vec::new(),
            slugs: HashSet::new(),
            next_page: initial.next_page,
            current_page: initial.page.max(1),
            shaper,
        };
        controller.append(initial.posts);
        controller
    }

    /// Continue from a cursor with nothing accumulated yet
    pub fn resume(cursor: Option<String>, current_page: u32, shaper: PageShaper) -> Self {
        Self::new(
            PostPage {
                posts: Vec::new(),
                next_page: cursor,
                page: current_page,
            },
            shaper,
        )
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Whether another page can be loaded
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the next page and append it
    ///
    /// A no-op once the cursor is terminal. Returns the posts appended by
    /// this call; slugs already in the list are skipped.
    pub async fn load_more(&mut self, source: &dyn ContentSource) -> SourceResult<&[PostSummary]> {
        let Some(cursor) = self.next_page.clone() else {
            return Ok(&[]);
        };

        let response = source.fetch_page(&cursor).await?;
        let page = self.shaper.page(&response);

        let start = self.posts.len();
        self.append(page.posts);
        self.next_page = page.next_page;
        self.current_page = if response.page == 0 {
            self.current_page + 1
        } else {
            page.page
        };

        tracing::debug!(
            "Loaded page {} ({} new posts, more: {})",
            self.current_page,
            self.posts.len() - start,
            self.has_more()
        );

        Ok(&self.posts[start..])
    }

    fn append(&mut self, posts: Vec<PostSummary>) {
        for post in posts {
            if self.slugs.insert(post.slug.clone()) {
                self.posts.push(post);
            }
        }
    }
}
