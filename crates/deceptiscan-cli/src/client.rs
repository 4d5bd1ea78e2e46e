//! Async HTTP client wrapping the DeceptiScan JSON API.
//!
//! The analysis services use the history half of this to "save to history";
//! the `deceptiscan` binary uses all of it.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use deceptiscan_core::{
  article::{Article, ArticlePage},
  history::HistoryEntry,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Connection settings for the DeceptiScan API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// ID token sent as `Authorization: Bearer <token>`.
  pub token:    Option<String>,
}

/// A non-2xx response, carrying the server's `{"error": "..."}` message.
#[derive(Debug, thiserror::Error)]
#[error("{request} → {status}: {message}")]
pub struct ServerError {
  pub request: String,
  pub status:  StatusCode,
  pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Deserialize)]
struct Created {
  id: String,
}

#[derive(Serialize)]
struct DataBody<'a> {
  data: &'a Value,
}

/// Async HTTP client for the DeceptiScan JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// `base_url` plus `segments`, each percent-encoded as one path segment.
  fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    let mut url = Url::parse(&self.config.base_url)
      .with_context(|| format!("invalid base URL {:?}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("base URL {:?} cannot carry a path", self.config.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req`, turning a non-2xx status into a [`ServerError`].
  async fn send(&self, req: RequestBuilder, request: String) -> Result<Response> {
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{request} failed"))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.canonical_reason().unwrap_or_default().to_owned(),
    };
    Err(ServerError { request, status, message }.into())
  }

  async fn json<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    request: String,
  ) -> Result<T> {
    let resp = self.send(req, request.clone()).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising response to {request}"))
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// `POST /history/{service}`: returns the new entry's id.
  pub async fn save_history(&self, service: &str, data: &Value) -> Result<String> {
    let url = self.url(["history", service])?;
    let created: Created = self
      .json(
        self.client.post(url).json(&DataBody { data }),
        format!("POST /history/{service}"),
      )
      .await?;
    Ok(created.id)
  }

  /// `GET /history/{service}`: newest first.
  pub async fn list_history(&self, service: &str) -> Result<Vec<HistoryEntry>> {
    let url = self.url(["history", service])?;
    self
      .json(self.client.get(url), format!("GET /history/{service}"))
      .await
  }

  /// `GET /history/{service}/{id}`
  pub async fn get_history(&self, service: &str, id: &str) -> Result<HistoryEntry> {
    let url = self.url(["history", service, id])?;
    self
      .json(self.client.get(url), format!("GET /history/{service}/{id}"))
      .await
  }

  /// `PUT /history/{service}/{id}`: shallow-merges `data` into the entry.
  pub async fn update_history(&self, service: &str, id: &str, data: &Value) -> Result<()> {
    let url = self.url(["history", service, id])?;
    self
      .send(
        self.client.put(url).json(&DataBody { data }),
        format!("PUT /history/{service}/{id}"),
      )
      .await?;
    Ok(())
  }

  /// `DELETE /history/{service}/{id}`
  pub async fn delete_history(&self, service: &str, id: &str) -> Result<()> {
    let url = self.url(["history", service, id])?;
    self
      .send(self.client.delete(url), format!("DELETE /history/{service}/{id}"))
      .await?;
    Ok(())
  }

  // ── Articles ──────────────────────────────────────────────────────────────

  /// `GET /articles[?page=<n>][&limit=<n>]`
  pub async fn list_articles(
    &self,
    page: Option<usize>,
    limit: Option<usize>,
  ) -> Result<ArticlePage> {
    let url = self.url(["articles"])?;
    let mut query = Vec::new();
    if let Some(page) = page {
      query.push(("page", page.to_string()));
    }
    if let Some(limit) = limit {
      query.push(("limit", limit.to_string()));
    }
    self
      .json(self.client.get(url).query(&query), "GET /articles".to_owned())
      .await
  }

  /// `GET /articles/{id}`
  pub async fn get_article(&self, id: &str) -> Result<Article> {
    let url = self.url(["articles", id])?;
    self
      .json(self.client.get(url), format!("GET /articles/{id}"))
      .await
  }

  /// `POST /articles`: returns the new article's id.
  pub async fn create_article(&self, fields: &Value) -> Result<String> {
    let url = self.url(["articles"])?;
    let created: Created = self
      .json(self.client.post(url).json(fields), "POST /articles".to_owned())
      .await?;
    Ok(created.id)
  }

  /// `PUT /articles/{id}`
  pub async fn update_article(&self, id: &str, fields: &Value) -> Result<()> {
    let url = self.url(["articles", id])?;
    self
      .send(self.client.put(url).json(fields), format!("PUT /articles/{id}"))
      .await?;
    Ok(())
  }

  /// `DELETE /articles/{id}`
  pub async fn delete_article(&self, id: &str) -> Result<()> {
    let url = self.url(["articles", id])?;
    self
      .send(self.client.delete(url), format!("DELETE /articles/{id}"))
      .await?;
    Ok(())
  }
}
