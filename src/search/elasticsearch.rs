//! Elasticsearch REST backend
//!
//! Talks to the node over its JSON HTTP API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | Existence check | `HEAD /{index}` |
//! | Index creation | `PUT /{index}` with `mappings` |
//! | Upsert | `PUT /{index}/_doc/{id}` (or `/{index}/{type}/{id}` with typed endpoints) |
//! | Stale retraction | `POST /{index}/_delete_by_query` |

use crate::config::SearchConfig;
use crate::search::{IndexDocument, IndexSchema, SearchClient, SearchError, SearchResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Error type Elasticsearch reports when creating an index that exists
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Exact-match subfield the dynamic mapping adds for `uri`
const URI_KEYWORD_FIELD: &str = "uri.keyword";

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    #[serde(default)]
    deleted: u64,
}

/// [`SearchClient`] for an Elasticsearch node
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    http: Client,
    endpoint: Url,
    typed_endpoints: bool,
    credentials: Option<(String, Option<String>)>,
}

impl ElasticsearchClient {
    /// Builds a client from the `[search]` configuration section
    pub fn from_config(config: &SearchConfig) -> SearchResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| SearchError::Endpoint(format!("{}: {}", config.endpoint, e)))?;

        if endpoint.cannot_be_a_base() {
            return Err(SearchError::Endpoint(config.endpoint.clone()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            typed_endpoints: config.typed_endpoints,
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    /// Builds `{endpoint}/{segments...}`, percent-encoding each segment
    fn url(&self, segments: &[&str]) -> SearchResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::Endpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, password.as_ref()),
            None => builder,
        }
    }

    fn document_url(&self, document: &IndexDocument) -> SearchResult<Url> {
        let doc_type = if self.typed_endpoints {
            document.document_type.as_str()
        } else {
            "_doc"
        };
        self.url(&[&document.index, doc_type, &document.id])
    }
}

/// Turns a non-success response into [`SearchError::Rejected`]
async fn check(response: Response) -> SearchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        let url = self.url(&[index])?;
        let response = self.request(Method::HEAD, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => check(response).await.map(|_| true),
        }
    }

    async fn create_index(&self, schema: &IndexSchema) -> SearchResult<()> {
        let url = self.url(&[&schema.index])?;
        let body = json!({ "mappings": schema.mappings(self.typed_endpoints) });

        let response = self.request(Method::PUT, url).json(&body).send().await?;

        match check(response).await {
            Ok(_) => Ok(()),
            // Another run created the index between the existence check and now.
            Err(SearchError::Rejected { status: 400, body }) if body.contains(ALREADY_EXISTS) => {
                tracing::debug!("Index {} was created concurrently", schema.index);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert_document(&self, document: &IndexDocument) -> SearchResult<()> {
        let url = self.document_url(document)?;
        let response = self
            .request(Method::PUT, url)
            .json(&document.body)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn delete_stale(
        &self,
        index: &str,
        manual: &str,
        version: &str,
        uri_prefix: &str,
        keep_ids: &[String],
    ) -> SearchResult<u64> {
        let mut url = self.url(&[index, "_delete_by_query"])?;
        url.query_pairs_mut()
            .append_pair("refresh", "true")
            .append_pair("conflicts", "proceed");

        let query = json!({
            "query": {
                "bool": {
                    "filter": [
                        { "term": { "manual": manual } },
                        { "term": { "version": version } },
                        { "prefix": { URI_KEYWORD_FIELD: uri_prefix } }
                    ],
                    "must_not": [
                        { "ids": { "values": keep_ids } }
                    ]
                }
            }
        });

        let response = self.request(Method::POST, url).json(&query).send().await?;
        let response = check(response).await?;
        let text = response.text().await?;
        let parsed: DeleteByQueryResponse = serde_json::from_str(&text)?;

        Ok(parsed.deleted)
    }
}
