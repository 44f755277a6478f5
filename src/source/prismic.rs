//! Prismic REST API client

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{
    ApiInfo, ContentSource, ListQuery, Record, SearchResponse, SourceError, SourceResult,
};
use crate::config::ApiConfig;

/// How long a resolved master ref is reused
const REF_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedRef {
    reference: String,
    fetched_at: Instant,
}

/// HTTP client for a Prismic repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    endpoint: String,
    access_token: Option<String>,
    document_type: String,
    client: Client,
    master: Arc<RwLock<Option<CachedRef>>>,
}

impl PrismicClient {
    /// Create a client for the configured repository
    pub fn new(config: &ApiConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout.max(1)))
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            document_type: config.document_type.clone(),
            client,
            master: Arc::new(RwLock::new(None)),
        })
    }

    /// Repository API root
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn owns(&self, cursor: &str) -> bool {
        cursor == self.endpoint
            || cursor
                .strip_prefix(&self.endpoint)
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> SourceResult<T> {
        let mut request = self.client.get(url).query(params);
        if let Some(token) = &self.access_token {
            if !url.contains("access_token=") {
                request = request.query(&[("access_token", token)]);
            }
        }

        tracing::debug!("GET {}", url);
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!("http status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }

    /// Resolve the ref of the currently published content
    ///
    /// A resolved ref is reused for `REF_TTL`.
    async fn master_ref(&self) -> SourceResult<String> {
        if let Some(cached) = self.master.read().await.as_ref() {
            if cached.fetched_at.elapsed() < REF_TTL {
                return Ok(cached.reference.clone());
            }
        }

        let info: ApiInfo = self.get_json(&self.endpoint, &[]).await?;
        let reference = info
            .refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.reference)
            .ok_or_else(|| SourceError::Decode("API root lists no master ref".to_string()))?;

        *self.master.write().await = Some(CachedRef {
            reference: reference.clone(),
            fetched_at: Instant::now(),
        });
        tracing::debug!("Resolved master ref {}", reference);
        Ok(reference)
    }

    async fn search(
        &self,
        predicate: String,
        extra: Vec<(&'static str, String)>,
    ) -> SourceResult<SearchResponse> {
        let reference = self.master_ref().await?;
        let mut params = vec![("ref", reference), ("q", predicate)];
        params.extend(extra);
        let response = self.get_json(&self.url("documents/search"), &params).await?;
        Ok(scrub_cursor(response))
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn list_posts(&self, query: &ListQuery) -> SourceResult<SearchResponse> {
        let predicate = format!(
            r#"[[at(document.type,"{}")]]"#,
            escape_literal(&self.document_type)
        );
        self.search(
            predicate,
            vec![
                ("orderings", query.ordering.to_query()),
                ("pageSize", query.page_size.to_string()),
                ("page", query.page.to_string()),
            ],
        )
        .await
    }

    async fn fetch_page(&self, cursor: &str) -> SourceResult<SearchResponse> {
        if !self.owns(cursor) {
            return Err(SourceError::InvalidCursor(cursor.to_string()));
        }
        let response = self.get_json(cursor, &[]).await?;
        Ok(scrub_cursor(response))
    }

    async fn get_post_by_slug(&self, slug: &str) -> SourceResult<Record> {
        let predicate = format!(
            r#"[[at(my.{}.uid,"{}")]]"#,
            self.document_type,
            escape_literal(slug)
        );
        let response = self
            .search(predicate, vec![("pageSize", "1".to_string())])
            .await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(slug.to_string()))
    }
}

/// Drop the access token the API echoes into `next_page`
///
/// Cursors end up in public pages; `get_json` adds the token back when one
/// is followed.
fn scrub_cursor(mut response: SearchResponse) -> SearchResponse {
    response.next_page = response.next_page.map(|url| without_access_token(&url));
    response
}

fn without_access_token(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "access_token")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.into()
}

/// Escape a string literal inside a predicate
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
