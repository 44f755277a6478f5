//! In-memory content source for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use super::{
    ContentSource, ListQuery, Record, RecordBlock, RecordData, RichTextNode, SearchResponse,
    SourceError, SourceResult,
};

const CURSOR_PREFIX: &str = "memory://posts";

pub(crate) struct MemorySource {
    records: Mutex<Vec<Record>>,
    offline: AtomicBool,
    fail_after: AtomicUsize,
    requests: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            offline: AtomicBool::new(false),
            fail_after: AtomicUsize::new(usize::MAX),
            requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_posts(slugs: &[&str]) -> Self {
        Self::new(slugs.iter().map(|s| record(s)).collect())
    }

    /// Make every following call fail with `Unavailable`
    pub(crate) fn go_offline(&self) {
        self.offline.store(true, AtomicOrdering::SeqCst);
    }

    /// Serve `requests` more calls, then fail like `go_offline`
    pub(crate) fn fail_after(&self, requests: usize) {
        let served = self.requests();
        self.fail_after.store(served + requests, AtomicOrdering::SeqCst);
    }

    /// Add a newer post at the head of the list
    pub(crate) fn publish(&self, slug: &str) {
        self.records.lock().unwrap().insert(0, record(slug));
    }

    pub(crate) fn requests(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    pub(crate) fn cursor(page: u32, page_size: u32) -> String {
        format!("{}?page={}&pageSize={}", CURSOR_PREFIX, page, page_size)
    }

    fn check(&self) -> SourceResult<()> {
        let request = self.requests.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        if self.offline.load(AtomicOrdering::SeqCst)
            || request > self.fail_after.load(AtomicOrdering::SeqCst)
        {
            return Err(SourceError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn page(&self, page: u32, page_size: u32) -> SearchResponse {
        let page = page.max(1);
        let size = page_size.max(1) as usize;
        let start = (page as usize - 1) * size;
        let records = self.records.lock().unwrap();
        let results: Vec<Record> = records.iter().skip(start).take(size).cloned().collect();
        let total_pages = records.len().div_ceil(size) as u32;
        SearchResponse {
            page,
            results_per_page: size as u32,
            total_results_size: records.len() as u32,
            total_pages,
            next_page: (page < total_pages).then(|| Self::cursor(page + 1, page_size)),
            results,
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_posts(&self, query: &ListQuery) -> SourceResult<SearchResponse> {
        self.check()?;
        Ok(self.page(query.page, query.page_size))
    }

    async fn fetch_page(&self, cursor: &str) -> SourceResult<SearchResponse> {
        self.check()?;
        let params = cursor
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|rest| rest.strip_prefix('?'))
            .ok_or_else(|| SourceError::InvalidCursor(cursor.to_string()))?;

        let mut page = 1;
        let mut page_size = 20;
        for pair in params.split('&') {
            match pair.split_once('=') {
                Some(("page", v)) => page = v.parse().unwrap_or(1),
                Some(("pageSize", v)) => page_size = v.parse().unwrap_or(20),
                _ => {}
            }
        }
        Ok(self.page(page, page_size))
    }

    async fn get_post_by_slug(&self, slug: &str) -> SourceResult<Record> {
        self.check()?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.uid.as_deref() == Some(slug))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(slug.to_string()))
    }
}

/// A complete post record with a two-block body
pub(crate) fn record(slug: &str) -> Record {
    Record {
        uid: Some(slug.to_string()),
        first_publication_date: Some("2021-03-25T19:25:28+0000".to_string()),
        data: RecordData {
            title: Some(format!("Post {}", slug)),
            subtitle: Some(format!("Subtitle of {}", slug)),
            author: Some("Joseph Oliveira".to_string()),
            banner: Some(super::ImageField {
                url: Some(format!("https://images.prismic.io/{}.png", slug)),
                alt: None,
            }),
            content: vec![
                RecordBlock {
                    heading: Some("Introduction".to_string()),
                    body: vec![RichTextNode::paragraph("one two three")],
                },
                RecordBlock {
                    heading: None,
                    body: vec![RichTextNode::paragraph("four five")],
                },
            ],
        },
    }
}
