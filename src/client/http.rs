//! reqwest-based implementation of [`CatalogBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use url::Url;

use crate::config::ServerConfig;

use super::error::{ClientError, ClientResult};
use super::models::{
    BookRecord, CatalogHit, CreateEntityRequest, DeleteOutcome, EntityRecord, FileRecord,
    MonitorFlagUpdate, Preferences, SearchHit, SearchQuery,
};
use super::CatalogBackend;

const API_KEY_HEADER: &str = "X-Api-Key";

/// HTTP client for the monitoring server API.
pub struct HttpBackend {
    base: Url,
    api_key: String,
    http: Client,
}

impl HttpBackend {
    /// Build a backend from a base URL and API key.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ClientResult<Self> {
        // A trailing slash keeps Url::join from eating the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|e| ClientError::url(e.to_string()))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            base,
            api_key: api_key.to_string(),
            http,
        })
    }

    pub fn from_config(config: &ServerConfig) -> ClientResult<Self> {
        Self::new(
            &config.base_url,
            &config.api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::url(e.to_string()))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            builder
        } else {
            builder.header(API_KEY_HEADER, &self.api_key)
        }
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_else(|_| String::new());
        let message = if message.is_empty() {
            status.to_string()
        } else {
            message
        };
        Err(ClientError::api(status.as_u16(), message))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.authed(self.http.get(self.url(path)?)).send().await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    async fn list_entities(&self) -> ClientResult<Vec<EntityRecord>> {
        self.get_json("api/v1/entity").await
    }

    async fn create_entity(&self, req: &CreateEntityRequest) -> ClientResult<EntityRecord> {
        let response = self
            .authed(self.http.post(self.url("api/v1/entity")?).json(req))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_books(&self, entity_id: i64) -> ClientResult<Vec<BookRecord>> {
        self.get_json(&format!("api/v1/entity/{entity_id}/books")).await
    }

    async fn list_files(&self, entity_id: i64) -> ClientResult<Vec<FileRecord>> {
        self.get_json(&format!("api/v1/entity/{entity_id}/files")).await
    }

    async fn update_monitor_flags(
        &self,
        entity_id: i64,
        batch: &[MonitorFlagUpdate],
    ) -> ClientResult<()> {
        let response = self
            .authed(
                self.http
                    .put(self.url(&format!("api/v1/entity/{entity_id}/monitor"))?)
                    .json(&json!({ "updates": batch })),
            )
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_entities(&self, ids: &[i64]) -> ClientResult<DeleteOutcome> {
        let response = self
            .authed(
                self.http
                    .post(self.url("api/v1/entity/delete")?)
                    .json(&json!({ "ids": ids })),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<SearchHit>> {
        let response = self
            .authed(self.http.post(self.url("api/v1/search")?).json(query))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn search_catalog(&self, query: &str, limit: usize) -> ClientResult<Vec<CatalogHit>> {
        let mut url = self.url("api/v1/catalog/search")?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string());
        let response = self.authed(self.http.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_preferences(&self) -> ClientResult<Preferences> {
        self.get_json("api/v1/preferences").await
    }

    async fn update_preferences(&self, patch: &Preferences) -> ClientResult<Preferences> {
        let response = self
            .authed(self.http.put(self.url("api/v1/preferences")?).json(patch))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&server.uri(), "secret", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_entities_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entity"))
            .and(header(API_KEY_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "kind": "author", "name": "Ursula K. Le Guin"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let entities = backend(&server).await.list_entities().await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Ursula K. Le Guin");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entity"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = backend(&server).await.list_entities().await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_update_monitor_flags_body_shape() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/entity/9/monitor"))
            .and(body_partial_json(json!({
                "updates": [{
                    "provider": "gr",
                    "provider_book_id": "42",
                    "monitor_ebook": false,
                    "monitor_audiobook": false
                }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let batch = vec![MonitorFlagUpdate {
            provider: "gr".into(),
            provider_book_id: "42".into(),
            monitor_ebook: false,
            monitor_audiobook: false,
        }];
        backend(&server)
            .await
            .update_monitor_flags(9, &batch)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_catalog_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/catalog/search"))
            .and(query_param("query", "dune"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"owner_entity_id": 2, "title": "Dune"}
            ])))
            .mount(&server)
            .await;

        let hits = backend(&server).await.search_catalog("dune", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book.title, "Dune");
    }
}
