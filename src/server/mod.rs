//! Blog server with incremental revalidation

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::PageCache;
use crate::generator::Generator;
use crate::source::{ContentSource, SourceError};
use crate::view::DetailState;
use crate::Blog;

const INDEX_ROUTE: &str = "/";

/// Server state
pub struct AppState {
    generator: Generator,
    cache: PageCache,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            cache: PageCache::new(),
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    fn revalidate_after(&self) -> Option<Duration> {
        match self.generator.blog().config.revalidate {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Errors a request can end with
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        let source = match self {
            ServerError::Source(e) => Some(e),
            ServerError::Render(e) => e.downcast_ref::<SourceError>(),
        };
        match source {
            Some(SourceError::InvalidCursor(_)) => StatusCode::BAD_REQUEST,
            Some(SourceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(SourceError::Unavailable(_)) | Some(SourceError::Decode(_)) => {
                StatusCode::BAD_GATEWAY
            }
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Parameters of one "load more" step
#[derive(Debug, Deserialize)]
struct MoreParams {
    cursor: String,
    /// Page the client currently shows
    #[serde(default)]
    page: Option<u32>,
}

/// Posts appended by one "load more" step
#[derive(Debug, Serialize, Deserialize)]
pub struct MoreResponse {
    pub html: String,
    pub next_page: Option<String>,
    pub page: u32,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let public_dir = state.generator.blog().public_dir.clone();

    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/posts/more", get(more_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the blog server
pub async fn start(
    blog: &Blog,
    source: Arc<dyn ContentSource>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let state = Arc::new(AppState::new(Generator::new(blog, source)?));
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    match state.revalidate_after() {
        Some(period) => println!("Revalidating the post list every {}s", period.as_secs()),
        None => println!("Revalidation disabled"),
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let _revalidation = spawn_revalidation(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Re-render the list page on a fixed interval, starting right away
pub fn spawn_revalidation(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let period = state.revalidate_after()?;

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            revalidate_index(&state).await;
        }
    }))
}

/// Render `/` into the cache; on failure the previous page stays
pub async fn revalidate_index(state: &AppState) -> bool {
    match state.generator.render_index().await {
        Ok(html) => {
            state
                .cache
                .insert(INDEX_ROUTE, html, state.revalidate_after())
                .await;
            tracing::info!("Revalidated {}", INDEX_ROUTE);
            true
        }
        Err(e) => {
            tracing::warn!("Revalidation of {} failed, keeping previous page: {:#}", INDEX_ROUTE, e);
            false
        }
    }
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    if let Some(html) = state.cache.get(INDEX_ROUTE).await {
        return Ok(Html(html));
    }

    match state.generator.render_index().await {
        Ok(html) => {
            state
                .cache
                .insert(INDEX_ROUTE, html.clone(), state.revalidate_after())
                .await;
            Ok(Html(html))
        }
        Err(e) => match state.cache.get_stale(INDEX_ROUTE).await {
            Some(html) => {
                tracing::warn!("Serving stale {}: {:#}", INDEX_ROUTE, e);
                Ok(Html(html))
            }
            None => Err(e.into()),
        },
    }
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, ServerError> {
    let route = format!("/post/{}", slug);
    if let Some(html) = state.cache.get(&route).await {
        return Ok(Html(html).into_response());
    }

    let view = state.generator.view();
    match state.generator.fetch_detail(&slug).await? {
        DetailState::Loading => {
            let html = view.detail(&DetailState::Loading)?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        ready => {
            let html = view.detail(&ready)?;
            state.cache.insert(&route, html.clone(), None).await;
            Ok(Html(html).into_response())
        }
    }
}

async fn more_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoreParams>,
) -> Result<Json<MoreResponse>, ServerError> {
    let controller = state
        .generator
        .load_more(&params.cursor, params.page.unwrap_or(1))
        .await?;

    Ok(Json(MoreResponse {
        html: state.generator.view().more(controller.posts())?,
        next_page: controller.next_page().map(str::to_string),
        page: controller.current_page(),
    }))
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::source::memory::MemorySource;

    struct TestServer {
        url: String,
        state: Arc<AppState>,
        source: Arc<MemorySource>,
        _dir: tempfile::TempDir,
    }

    async fn serve(slugs: &[&str]) -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        std::fs::create_dir_all(blog.public_dir.join("images")).unwrap();
        std::fs::write(blog.public_dir.join("images/logo.svg"), "<svg/>").unwrap();

        let source = Arc::new(MemorySource::with_posts(slugs));
        let state = Arc::new(AppState::new(Generator::new(&blog, source.clone()).unwrap()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            url: format!("http://{}", addr),
            state,
            source,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_index_is_cached() {
        let server = serve(&["a", "b", "c"]).await;

        let first = reqwest::get(format!("{}/", server.url)).await.unwrap();
        assert_eq!(first.status(), 200);
        let body = first.text().await.unwrap();
        assert!(body.contains(r#"data-slug="a""#));
        assert!(body.contains(r#"id="load-more""#));
        let requests = server.source.requests();

        let second = reqwest::get(format!("{}/", server.url)).await.unwrap();
        assert_eq!(second.text().await.unwrap(), body);
        assert_eq!(server.source.requests(), requests);
    }

    #[tokio::test]
    async fn test_index_unavailable_is_bad_gateway() {
        let server = serve(&["a"]).await;
        server.source.go_offline();

        let response = reqwest::get(format!("{}/", server.url)).await.unwrap();
        assert_eq!(response.status(), 502);
    }

    #[tokio::test]
    async fn test_failed_revalidation_keeps_previous_page() {
        let server = serve(&["a"]).await;
        assert!(revalidate_index(&server.state).await);
        let before = server.state.cache().get(INDEX_ROUTE).await.unwrap();

        server.source.go_offline();
        assert!(!revalidate_index(&server.state).await);
        assert_eq!(server.state.cache().get(INDEX_ROUTE).await.unwrap(), before);

        let response = reqwest::get(format!("{}/", server.url)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_stale_index_served_when_source_fails() {
        let server = serve(&["a"]).await;
        server
            .state
            .cache()
            .insert(INDEX_ROUTE, "old list".to_string(), Some(Duration::ZERO))
            .await;
        server.source.go_offline();

        let response = reqwest::get(format!("{}/", server.url)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "old list");
    }

    #[tokio::test]
    async fn test_post_page() {
        let server = serve(&["a"]).await;

        let response = reqwest::get(format!("{}/post/a", server.url)).await.unwrap();
        assert_eq!(response.status(), 200);
        let body = response.text().await.unwrap();
        assert!(body.contains("<h1>Post a</h1>"));
        assert!(body.contains(r#"<p class="reading-time">1 min</p>"#));
        assert!(server.state.cache().get("/post/a").await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_post_renders_loading() {
        let server = serve(&["a"]).await;

        let response = reqwest::get(format!("{}/post/missing", server.url)).await.unwrap();
        assert_eq!(response.status(), 404);
        assert!(response.text().await.unwrap().contains("Carregando..."));
        assert!(server.state.cache().get("/post/missing").await.is_none());
    }

    #[tokio::test]
    async fn test_load_more() {
        let server = serve(&["a", "b", "c", "d", "e"]).await;
        let cursor = MemorySource::cursor(2, 2);

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/posts/more", server.url))
            .query(&[("cursor", cursor.as_str()), ("page", "1")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let more: MoreResponse = response.json().await.unwrap();
        assert!(more.html.contains(r#"data-slug="c""#));
        assert!(more.html.contains(r#"data-slug="d""#));
        assert!(!more.html.contains(r#"data-slug="a""#));
        assert_eq!(more.page, 2);
        assert_eq!(more.next_page, Some(MemorySource::cursor(3, 2)));
    }

    #[tokio::test]
    async fn test_load_more_rejects_foreign_cursor() {
        let server = serve(&["a", "b", "c"]).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/posts/more", server.url))
            .query(&[("cursor", "http://169.254.169.254/latest")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let missing = reqwest::get(format!("{}/posts/more", server.url)).await.unwrap();
        assert_eq!(missing.status(), 400);
    }

    #[tokio::test]
    async fn test_static_assets() {
        let server = serve(&["a"]).await;

        let response = reqwest::get(format!("{}/images/logo.svg", server.url))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "<svg/>");
    }

    fn app_state(source: Arc<MemorySource>, revalidate: u64) -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig {
            revalidate,
            ..SiteConfig::default()
        };
        let blog = Blog::with_config(dir.path(), config);
        let state = Arc::new(AppState::new(Generator::new(&blog, source).unwrap()));
        (state, dir)
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_revalidation() {
        let source = Arc::new(MemorySource::with_posts(&["a", "b"]));
        let (state, _dir) = app_state(source.clone(), 60);
        let task = spawn_revalidation(state.clone()).unwrap();

        // First render happens right away
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.requests(), 1);
        let first = state.cache().get(INDEX_ROUTE).await.unwrap();
        assert!(first.contains(r#"data-slug="a""#));
        assert!(!first.contains(r#"data-slug="fresh""#));

        source.publish("fresh");
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.requests(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.requests(), 2);
        let second = state.cache().get(INDEX_ROUTE).await.unwrap();
        assert!(second.contains(r#"data-slug="fresh""#));

        task.abort();
    }

    #[tokio::test]
    async fn test_revalidate_zero_disables_expiry() {
        let source = Arc::new(MemorySource::with_posts(&["a"]));
        let (state, _dir) = app_state(source.clone(), 0);
        assert!(spawn_revalidation(state.clone()).is_none());

        assert!(revalidate_index(&state).await);
        let entry = state.cache().entry(INDEX_ROUTE).await.unwrap();
        assert_eq!(entry.ttl, None);

        let (state, _dir) = app_state(Arc::new(MemorySource::with_posts(&["a"])), 86400);
        assert!(revalidate_index(&state).await);
        let entry = state.cache().entry(INDEX_ROUTE).await.unwrap();
        assert_eq!(entry.ttl, Some(Duration::from_secs(86400)));
    }

    #[test]
    fn test_error_status() {
        let unavailable = ServerError::from(SourceError::Unavailable("down".to_string()));
        assert_eq!(unavailable.status(), StatusCode::BAD_GATEWAY);

        let wrapped = ServerError::from(anyhow::Error::new(SourceError::Unavailable(
            "down".to_string(),
        )));
        assert_eq!(wrapped.status(), StatusCode::BAD_GATEWAY);

        let render = ServerError::from(anyhow::anyhow!("template"));
        assert_eq!(render.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
