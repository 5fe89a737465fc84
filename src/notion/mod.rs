use async_trait::async_trait;
use reqwest::{Client, Method, Request, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config;

pub mod model;

pub use model::{CreatePageRequest, Icon, Parent};

const NOTION_API_BASE: &str = "https://api.notion.com/";
const DEFAULT_VERSION: &str = "2022-06-28";

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("failed to reach Notion: {0}")]
    Request(#[from] reqwest::Error),
    #[error("notion error {status}: {body}")]
    Api { status: u16, body: Value },
    #[error("invalid Notion response JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid Notion base URL: {0}")]
    BaseUrl(String),
}

impl NotionError {
    /// JSON payload describing the failure. For API errors this is the body
    /// Notion sent back (`{object, status, code, message}`).
    pub fn to_raw(&self) -> Value {
        match self {
            NotionError::Api { body, .. } => body.clone(),
            NotionError::Request(err) => json!({
                "code": if err.is_timeout() { "request_timeout" } else { "request_failed" },
                "message": err.to_string(),
            }),
            NotionError::Decode(err) => json!({
                "code": "invalid_json",
                "message": err.to_string(),
            }),
            NotionError::BaseUrl(url) => json!({
                "code": "invalid_base_url",
                "message": format!("cannot build Notion URLs from {url}"),
            }),
        }
    }
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// The four Notion operations the proxy forwards to.
#[async_trait]
pub trait NotionService: Send + Sync {
    async fn query_database(&self, database_id: &str) -> Result<Value, NotionError>;

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, NotionError>;

    async fn list_block_children(
        &self,
        block_id: &str,
        page_size: u32,
    ) -> Result<Value, NotionError>;

    async fn create_page(&self, body: &CreatePageRequest) -> Result<Value, NotionError>;
}

impl NotionClient {
    pub fn new(token: String) -> Result<Self, NotionError> {
        let base_url =
            Url::parse(NOTION_API_BASE).map_err(|e| NotionError::BaseUrl(e.to_string()))?;
        Self::with_base_url(token, DEFAULT_VERSION.to_string(), base_url, None)
    }

    pub fn with_base_url(
        token: String,
        version: String,
        mut base_url: Url,
        timeout: Option<Duration>,
    ) -> Result<Self, NotionError> {
        if base_url.cannot_be_a_base() {
            return Err(NotionError::BaseUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().user_agent("recetas-proxy/0.1").no_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url,
            token,
            version,
        })
    }

    /// Build a client from the `notion` section. The token is copied into the
    /// client and is not read from anywhere else afterwards.
    pub fn from_config(cfg: &config::Notion) -> Result<Self, NotionError> {
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| NotionError::BaseUrl(format!("{}: {e}", cfg.base_url)))?;
        Self::with_base_url(
            cfg.token.clone(),
            cfg.version.clone(),
            base_url,
            Some(Duration::from_secs(cfg.timeout_secs)),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, NotionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NotionError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
    }

    pub fn build_query_database(&self, database_id: &str) -> Result<Request, NotionError> {
        let url = self.endpoint(&["v1", "databases", database_id, "query"])?;
        Ok(self.request(Method::POST, url).json(&json!({})).build()?)
    }

    pub fn build_retrieve_page(&self, page_id: &str) -> Result<Request, NotionError> {
        let url = self.endpoint(&["v1", "pages", page_id])?;
        Ok(self.request(Method::GET, url).build()?)
    }

    pub fn build_list_block_children(
        &self,
        block_id: &str,
        page_size: u32,
    ) -> Result<Request, NotionError> {
        let url = self.endpoint(&["v1", "blocks", block_id, "children"])?;
        Ok(self
            .request(Method::GET, url)
            .query(&[("page_size", page_size)])
            .build()?)
    }

    pub fn build_create_page(&self, body: &CreatePageRequest) -> Result<Request, NotionError> {
        let url = self.endpoint(&["v1", "pages"])?;
        Ok(self.request(Method::POST, url).json(body).build()?)
    }

    async fn execute(&self, request: Request) -> Result<Value, NotionError> {
        debug!(method = %request.method(), url = %request.url(), "notion request");

        let res = self.http.execute(request).await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(body = %text, "rate limited by Notion");
            } else {
                warn!(status = status.as_u16(), body = %text, "notion api error");
            }
            let body = serde_json::from_str(&text)
                .unwrap_or_else(|_| json!({ "status": status.as_u16(), "body": text }));
            return Err(NotionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), bytes = text.len(), "notion response");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl NotionService for NotionClient {
    async fn query_database(&self, database_id: &str) -> Result<Value, NotionError> {
        let request = self.build_query_database(database_id)?;
        self.execute(request).await
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, NotionError> {
        let request = self.build_retrieve_page(page_id)?;
        self.execute(request).await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        page_size: u32,
    ) -> Result<Value, NotionError> {
        let request = self.build_list_block_children(block_id, page_size)?;
        self.execute(request).await
    }

    async fn create_page(&self, body: &CreatePageRequest) -> Result<Value, NotionError> {
        let request = self.build_create_page(body)?;
        self.execute(request).await
    }
}
