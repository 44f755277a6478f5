//! List posts known to the content API

use anyhow::Result;

use crate::content::PageShaper;
use crate::source::{ContentSource, ListQuery};
use crate::Blog;

/// Print every post, newest first, walking all result pages
pub async fn run(blog: &Blog, source: &dyn ContentSource) -> Result<()> {
    let shaper = PageShaper::from_config(&blog.config);
    let lines = collect(&shaper, source, &ListQuery::from_config(&blog.config.api)).await?;

    println!("Posts ({}):", lines.len());
    for line in lines {
        println!("  {}", line);
    }

    Ok(())
}

async fn collect(
    shaper: &PageShaper,
    source: &dyn ContentSource,
    query: &ListQuery,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut response = source.list_posts(query).await?;

    loop {
        for record in &response.results {
            match shaper.summary(record) {
                Some(post) => lines.push(format!(
                    "{} - {} [{}]",
                    post.first_publication_date.as_deref().unwrap_or("-"),
                    post.title,
                    post.slug
                )),
                None => tracing::debug!("Skipping record without uid"),
            }
        }

        match response.next_page.take() {
            Some(cursor) => response = source.fetch_page(&cursor).await?,
            None => break,
        }
    }

    Ok(lines)
}
