//! Shaping raw records into view models
//!
//! Pure functions: the same record and settings always give the same output,
//! and nothing here performs I/O.

use chrono::Locale;
use chrono_tz::Tz;
use std::collections::HashSet;

use super::{ContentBlock, PostDetail, PostPage, PostSummary};
use crate::config::SiteConfig;
use crate::helpers::{format_date, parse_timestamp};
use crate::source::{Record, SearchResponse};

/// Turns source records into post summaries and details
#[derive(Debug, Clone)]
pub struct PageShaper {
    date_format: String,
    locale: Locale,
    timezone: Tz,
}

impl PageShaper {
    pub fn new(date_format: &str, locale: Locale, timezone: Tz) -> Self {
        Self {
            date_format: date_format.to_string(),
            locale,
            timezone,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.date_format, config.locale(), config.tz())
    }

    /// Format a raw publication timestamp for display
    pub fn format_date(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        match parse_timestamp(raw) {
            Some(date) => Some(format_date(
                &date.with_timezone(&self.timezone),
                &self.date_format,
                self.locale,
            )),
            None => {
                tracing::warn!("Unparseable publication date {:?}", raw);
                None
            }
        }
    }

    /// Shape a record for the list, `None` when it has no slug
    pub fn summary(&self, record: &Record) -> Option<PostSummary> {
        let Some(slug) = record.uid.clone().filter(|uid| !uid.is_empty()) else {
            tracing::warn!("Skipping record without uid");
            return None;
        };

        let data = &record.data;
        Some(PostSummary {
            slug,
            first_publication_date: self.format_date(record.first_publication_date.as_deref()),
            title: data.title.clone().unwrap_or_default(),
            subtitle: data.subtitle.clone().unwrap_or_default(),
            author: data.author.clone().unwrap_or_default(),
        })
    }

    /// Shape a record for its detail page, `None` when it has no slug
    pub fn detail(&self, record: &Record) -> Option<PostDetail> {
        let summary = self.summary(record)?;
        let data = &record.data;

        Some(PostDetail {
            summary,
            banner: data
                .banner
                .as_ref()
                .and_then(|b| b.url.clone())
                .filter(|url| !url.is_empty()),
            content: data
                .content
                .iter()
                .map(|block| ContentBlock {
                    heading: block.heading.clone().filter(|h| !h.is_empty()),
                    body: block.body.clone(),
                })
                .collect(),
        })
    }

    /// Shape a page of results, keeping the first post for each slug
    pub fn page(&self, response: &SearchResponse) -> PostPage {
        let mut seen = HashSet::new();
        let posts = response
            .results
            .iter()
            .filter_map(|r| self.summary(r))
            .filter(|p| {
                let fresh = seen.insert(p.slug.clone());
                if !fresh {
                    tracing::warn!("Dropping duplicate slug {:?}", p.slug);
                }
                fresh
            })
            .collect();

        PostPage {
            posts,
            next_page: response.next_page.clone().filter(|c| !c.is_empty()),
            page: response.page.max(1),
        }
    }
}

impl Default for PageShaper {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::record;
    use crate::source::{ImageField, RecordBlock};

    #[test]
    fn test_summary_has_the_five_fields() {
        let shaper = PageShaper::default();
        let summary = shaper.summary(&record("como-utilizar-hooks")).unwrap();
        assert_eq!(
            summary,
            PostSummary {
                slug: "como-utilizar-hooks".to_string(),
                first_publication_date: Some("25 mar 2021".to_string()),
                title: "Post como-utilizar-hooks".to_string(),
                subtitle: "Subtitle of como-utilizar-hooks".to_string(),
                author: "Joseph Oliveira".to_string(),
            }
        );

        let json = serde_json::to_value(&summary).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["author", "first_publication_date", "slug", "subtitle", "title"]
        );
    }

    #[test]
    fn test_date_uses_timezone_and_locale() {
        let shaper = PageShaper::new("dd MMM yyyy", Locale::pt_BR, chrono_tz::America::Sao_Paulo);
        assert_eq!(
            shaper.format_date(Some("2021-01-01T01:00:00+0000")),
            Some("31 dez 2020".to_string())
        );

        let shaper = PageShaper::new("dd MMM yyyy", Locale::en_US, Tz::UTC);
        assert_eq!(
            shaper.format_date(Some("2021-01-01T01:00:00+0000")),
            Some("01 Jan 2021".to_string())
        );
    }

    #[test]
    fn test_missing_fields_stay_nullable() {
        let shaper = PageShaper::default();
        let mut raw = Record::default();
        raw.uid = Some("bare".to_string());
        raw.first_publication_date = Some("not a date".to_string());

        let summary = shaper.summary(&raw).unwrap();
        assert_eq!(summary.first_publication_date, None);
        assert_eq!(summary.title, "");

        let detail = shaper.detail(&raw).unwrap();
        assert_eq!(detail.banner, None);
        assert!(detail.content.is_empty());
    }

    #[test]
    fn test_record_without_uid_is_skipped() {
        let shaper = PageShaper::default();
        assert!(shaper.summary(&Record::default()).is_none());
        assert!(shaper.detail(&Record::default()).is_none());
    }

    #[test]
    fn test_detail() {
        let shaper = PageShaper::default();
        let mut raw = record("a");
        raw.data.banner = Some(ImageField {
            url: Some(String::new()),
            alt: None,
        });
        raw.data.content.push(RecordBlock {
            heading: Some(String::new()),
            body: Vec::new(),
        });

        let detail = shaper.detail(&raw).unwrap();
        assert_eq!(detail.summary.slug, "a");
        assert_eq!(detail.banner, None);
        assert_eq!(detail.content.len(), 3);
        assert_eq!(detail.content[0].heading.as_deref(), Some("Introduction"));
        assert_eq!(detail.content[0].text(), "one two three");
        assert_eq!(detail.content[2].heading, None);
    }

    #[test]
    fn test_page_drops_duplicate_slugs() {
        let shaper = PageShaper::default();
        let response = SearchResponse {
            page: 3,
            next_page: Some("cursor".to_string()),
            results: vec![record("a"), Record::default(), record("b"), record("a")],
            ..SearchResponse::default()
        };
        let page = shaper.page(&response);
        let slugs: Vec<_> = page.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b"]);
        assert_eq!(page.next_page.as_deref(), Some("cursor"));
        assert_eq!(page.page, 3);
    }
}
