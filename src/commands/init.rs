//! Initialize a new blog directory

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
language: pt_BR
timezone: UTC
date_format: dd MMM yyyy

# URL
root: /

# Directory
source_dir: source
public_dir: public

# Rendering
revalidate: 86400
reading_speed: 200
labels:
  load_more:
  loading:
  home:

# Content API
# PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override endpoint and access_token
api:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  access_token:
  document_type: posts
  page_size: 2
  order_field: document.first_publication_date
  order_direction: desc
  timeout: 15
"#;

const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="26" viewBox="0 0 240 26">
  <text x="0" y="21" font-family="Inter, sans-serif" font-size="24" font-weight="700" fill="#F8F8F8">spacetraveling<tspan fill="#FF57B2">.</tspan></text>
</svg>
"##;

/// Initialize a new blog in the given directory
///
/// Existing files are left alone.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("source/images"))?;

    write_if_missing(&target_dir.join("_config.yml"), CONFIG_TEMPLATE)?;
    write_if_missing(&target_dir.join("source/images/logo.svg"), LOGO_SVG)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::info!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created: {:?}", path);
    Ok(())
}
