//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::generator::Generator;
use crate::source::ContentSource;
use crate::Blog;

/// Fetch every post and write the site into the public directory
pub async fn run(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, source)?;
    let stats = generator.generate().await?;

    if stats.skipped > 0 {
        tracing::warn!("Skipped {} posts", stats.skipped);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts in {:.2}s",
        stats.posts,
        duration.as_secs_f64()
    );

    Ok(())
}
