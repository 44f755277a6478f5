//! Generator module - runs the list and detail flows and writes static HTML

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use crate::content::{PageShaper, PostPage};
use crate::helpers::is_safe_segment;
use crate::pagination::PaginationController;
use crate::source::{ContentSource, ListQuery, SourceError, SourceResult};
use crate::view::{DetailState, View};
use crate::Blog;

/// Page size used when walking the whole list for static paths
const PATHS_PAGE_SIZE: u32 = 100;

/// What a generation run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub posts: usize,
    pub skipped: usize,
}

/// Fetch, shape and render pipeline shared by `generate` and the server
pub struct Generator {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    shaper: PageShaper,
    view: View,
}

impl Generator {
    /// Create a new generator around an injected content source
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            source,
            shaper: PageShaper::from_config(&blog.config),
            view: View::new(&blog.config)?,
        })
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// First page of the list as configured
    pub fn list_query(&self) -> ListQuery {
        ListQuery::from_config(&self.blog.config.api)
    }

    /// List flow: fetch and shape the first page
    pub async fn fetch_index(&self) -> SourceResult<PostPage> {
        let response = self.source.list_posts(&self.list_query()).await?;
        Ok(self.shaper.page(&response))
    }

    /// Detail flow: fetch and shape one post
    ///
    /// An unknown slug is not an error here; it yields the loading state.
    pub async fn fetch_detail(&self, slug: &str) -> SourceResult<DetailState> {
        match self.source.get_post_by_slug(slug).await {
            Ok(record) => Ok(self
                .shaper
                .detail(&record)
                .map(|post| DetailState::Ready(Box::new(post)))
                .unwrap_or(DetailState::Loading)),
            Err(SourceError::NotFound(_)) => {
                tracing::debug!("No post for slug {:?}", slug);
                Ok(DetailState::Loading)
            }
            Err(e) => Err(e),
        }
    }

    /// One "load more" step starting at `cursor`
    pub async fn load_more(&self, cursor: &str, current_page: u32) -> SourceResult<PaginationController> {
        let mut controller = PaginationController::resume(
            Some(cursor.to_string()),
            current_page,
            self.shaper.clone(),
        );
        controller.load_more(self.source.as_ref()).await?;
        Ok(controller)
    }

    /// Render the list page
    pub async fn render_index(&self) -> Result<String> {
        let page = self.fetch_index().await?;
        self.view.list(&page)
    }

    /// Generate the entire site into the public directory
    ///
    /// Everything is fetched and rendered before the first file is written,
    /// so a failing source leaves the previous output untouched.
    pub async fn generate(&self) -> Result<GenerateStats> {
        let index = self.render_index().await?;

        let mut stats = GenerateStats::default();
        let query = ListQuery {
            page_size: PATHS_PAGE_SIZE,
            ..self.list_query()
        };
        let slugs = self.source.all_slugs(&query).await?;

        let mut pages = Vec::with_capacity(slugs.len());
        for slug in slugs {
            if !is_safe_segment(&slug) {
                tracing::warn!("Skipping post with unusable slug {:?}", slug);
                stats.skipped += 1;
                continue;
            }

            match self.fetch_detail(&slug).await? {
                DetailState::Ready(post) => {
                    let html = self.view.detail(&DetailState::Ready(post))?;
                    pages.push((Path::new("post").join(&slug).join("index.html"), html));
                }
                DetailState::Loading => {
                    tracing::warn!("Post {:?} disappeared during generation", slug);
                    stats.skipped += 1;
                }
            }
        }

        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create dir {:?}", public_dir))?;

        // Copy static assets (logo, images, etc.)
        self.copy_source_assets()?;

        self.write_page(Path::new("index.html"), &index)?;
        tracing::info!("Generated index page");

        for (path, html) in &pages {
            self.write_page(path, html)?;
        }
        stats.posts = pages.len();

        tracing::info!("Generated {} post pages", stats.posts);
        Ok(stats)
    }

    fn write_page(&self, relative: &Path, html: &str) -> Result<()> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy everything under the source directory into the public directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() {
                let relative = path.strip_prefix(source_dir)?;
                let dest = self.blog.public_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }

                fs::copy(path, &dest)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            }
        }

        Ok(())
    }
}
