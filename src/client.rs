use std::time::Duration;

use thiserror::Error;

use crate::orchestrator::ListingsSource;
use crate::types::{Listing, ListingsResponse};

pub const DEFAULT_ENDPOINT: &str = "https://openapi.etsy.com/v2/listings/active";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("listings request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("listings API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse listings response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for EtsyClient
#[derive(Debug, Clone)]
pub struct EtsyConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl EtsyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the active-listings endpoint.
pub struct EtsyClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl EtsyClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ListingsError> {
        Self::with_config(EtsyConfig::new(api_key))
    }

    pub fn with_config(config: EtsyConfig) -> Result<Self, ListingsError> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            api_key: config.api_key,
            endpoint: config.endpoint,
        })
    }

    /// Active listings from shops in `location` ("City, ST"), optionally
    /// filtered by a tag.
    pub async fn listings(&self, location: &str, tag: Option<&str>) -> Result<Vec<Listing>, ListingsError> {
        let mut params = vec![("api_key", self.api_key.as_str()), ("location", location)];
        if let Some(tag) = tag {
            params.push(("tags", tag));
        }

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ListingsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: ListingsResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            %location,
            total = ?envelope.count,
            returned = envelope.results.len(),
            "Listings page received"
        );
        Ok(envelope.results)
    }
}

impl ListingsSource for EtsyClient {
    async fn search(&self, location: &str, tag: Option<&str>) -> Result<Vec<Listing>, ListingsError> {
        self.listings(location, tag).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;

    use super::*;

    async fn fake_listings(Query(params): Query<HashMap<String, String>>) -> Response {
        if params.get("api_key").map(String::as_str) != Some("test-key") {
            return (StatusCode::FORBIDDEN, "bad api key").into_response();
        }
        match params.get("location").map(String::as_str) {
            Some("CARBONDALE, IL") => {
                let title = params.get("tags").cloned().unwrap_or_else(|| "anything".to_string());
                axum::Json(serde_json::json!({
                    "count": 1,
                    "results": [{"listing_id": 1, "title": title, "url": "https://example.com/1"}]
                }))
                .into_response()
            }
            Some("GARBLED, IL") => "not json".into_response(),
            _ => axum::Json(serde_json::json!({"count": 0, "results": []})).into_response(),
        }
    }

    async fn serve() -> SocketAddr {
        let app = Router::new().route("/v2/listings/active", get(fake_listings));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr, api_key: &str) -> EtsyClient {
        EtsyClient::with_config(EtsyConfig {
            endpoint: format!("http://{addr}/v2/listings/active"),
            ..EtsyConfig::new(api_key)
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_listings_with_and_without_tag() {
        let addr = serve().await;
        let client = client(addr, "test-key");

        let listings = client.listings("CARBONDALE, IL", Some("necklace")).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "necklace");
        assert_eq!(listings[0].listing_id, Some(1));

        let listings = client.search("CARBONDALE, IL", None).await.unwrap();
        assert_eq!(listings[0].title, "anything");

        assert!(client.listings("NOWHERE, IL", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_api_error() {
        let addr = serve().await;
        let err = client(addr, "wrong").listings("CARBONDALE, IL", None).await.unwrap_err();
        match err {
            ListingsError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "bad api key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let addr = serve().await;
        let err = client(addr, "test-key").listings("GARBLED, IL", None).await.unwrap_err();
        assert!(matches!(err, ListingsError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(addr, "test-key").listings("CARBONDALE, IL", None).await.unwrap_err();
        assert!(matches!(err, ListingsError::Http(_)));
    }
}
