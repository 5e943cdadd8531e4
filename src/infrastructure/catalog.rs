use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::domain::catalog::{SearchResults, Volume};
use crate::domain::ids::VolumeId;

pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/";
const USER_AGENT: &str = "shelfmark/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response, carrying the HTTP status text. No retry happens
    /// at this layer.
    #[error("catalog request failed ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),
}

/// Thin read-only client for the volumes API. Search results and details
/// are transient; nothing is cached.
pub struct CatalogClient {
    base_url: Url,
    http: reqwest::Client,
    api_key: String,
}

impl CatalogClient {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self, CatalogError> {
        let mut normalized = base_url;
        if !normalized.path().ends_with('/') {
            normalized.set_path(&format!("{}/", normalized.path().trim_end_matches('/')));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: normalized,
            http,
            api_key: api_key.into(),
        })
    }

    pub fn from_base_url(base_url: &str, api_key: impl Into<String>) -> Result<Self, CatalogError> {
        let url =
            Url::parse(base_url).map_err(|_| CatalogError::InvalidUrl(base_url.to_string()))?;
        Self::new(url, api_key)
    }

    /// Full-text search. A response without an `items` field is an empty
    /// result set, not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<Volume>, CatalogError> {
        let mut url = self.endpoint("volumes")?;
        url.query_pairs_mut().append_pair("q", query);
        self.append_key(&mut url);

        let results: SearchResults = self.get_json(url).await?;
        Ok(results.items)
    }

    /// Fetch full display data for a bare volume id. Always a fresh
    /// remote call.
    pub async fn fetch(&self, id: &VolumeId) -> Result<Volume, CatalogError> {
        let mut url = self.endpoint(&format!("volumes/{id}"))?;
        self.append_key(&mut url);
        self.get_json(url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|_| CatalogError::InvalidUrl(path.to_string()))
    }

    fn append_key(&self, url: &mut Url) {
        if !self.api_key.is_empty() {
            url.query_pairs_mut().append_pair("key", &self.api_key);
        }
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
            return Err(CatalogError::Status { status, message });
        }
        Ok(response.json::<T>().await?)
    }
}
