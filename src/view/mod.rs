//! Views - rendering shaped posts to HTML
//!
//! Views hold no per-request state; everything they show comes in through
//! the shaped models.

use anyhow::Result;
use tera::Context;

use crate::config::SiteConfig;
use crate::content::{reading_time, PostDetail, PostPage, PostSummary};
use crate::helpers::{html_escape, meta_generator, post_url, url_for};
use crate::i18n::Labels;
use crate::templates::{ArticleData, BlockData, PostItemData, SiteData, TemplateRenderer};

/// What the detail route currently knows about its post
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// The slug has not resolved to a post (yet)
    Loading,
    Ready(Box<PostDetail>),
}

/// Renders the list, the load-more fragment and the detail pages
pub struct View {
    renderer: TemplateRenderer,
    config: SiteConfig,
    labels: Labels,
}

impl View {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            config: config.clone(),
            labels: Labels::resolve(&config.language, &config.labels),
        })
    }

    /// Path of the load-more endpoint
    pub fn more_url(&self) -> String {
        url_for(&self.config, "posts/more")
    }

    fn base_context(&self) -> Context {
        let site = SiteData {
            title: self.config.title.clone(),
            lang: self.config.language.replace('_', "-"),
            root: html_escape(&url_for(&self.config, "")),
            logo: html_escape(&url_for(&self.config, "images/logo.svg")),
            generator: meta_generator(),
        };

        let mut context = Context::new();
        context.insert("site", &site);
        context.insert("labels", &self.labels);
        context
    }

    /// Template data for one list entry
    pub fn item(&self, post: &PostSummary) -> PostItemData {
        PostItemData {
            slug: post.slug.clone(),
            path: html_escape(&post_url(&self.config, &post.slug)),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            date: post.first_publication_date.clone().unwrap_or_default(),
            author: post.author.clone(),
        }
    }

    /// Template data for a post page
    pub fn article(&self, post: &PostDetail) -> ArticleData {
        ArticleData {
            title: post.summary.title.clone(),
            banner: post.banner.as_deref().map(html_escape),
            date: post.summary.first_publication_date.clone().unwrap_or_default(),
            author: post.summary.author.clone(),
            reading_time: reading_time(&post.content, self.config.reading_speed),
            blocks: post
                .content
                .iter()
                .map(|block| BlockData {
                    heading: block.heading.clone(),
                    html: block.html(),
                })
                .collect(),
        }
    }

    /// Render the post list with its load-more affordance
    pub fn list(&self, page: &PostPage) -> Result<String> {
        let posts: Vec<PostItemData> = page.posts.iter().map(|p| self.item(p)).collect();

        let mut context = self.base_context();
        context.insert("posts", &posts);
        context.insert("next_page", &page.next_page);
        context.insert("page", &page.page);
        context.insert("more_url", &html_escape(&self.more_url()));

        self.renderer.render("index.html", &context)
    }

    /// Render list entries alone, for appending to an existing list
    pub fn more(&self, posts: &[PostSummary]) -> Result<String> {
        let posts: Vec<PostItemData> = posts.iter().map(|p| self.item(p)).collect();

        let mut context = self.base_context();
        context.insert("posts", &posts);

        self.renderer.render("more.html", &context)
    }

    /// Render a post page, or the loading placeholder
    pub fn detail(&self, state: &DetailState) -> Result<String> {
        match state {
            DetailState::Loading => self.renderer.render("loading.html", &self.base_context()),
            DetailState::Ready(post) => {
                let mut context = self.base_context();
                context.insert("article", &self.article(post));
                self.renderer.render("post.html", &context)
            }
        }
    }
}
