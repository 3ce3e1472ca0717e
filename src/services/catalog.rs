//! Catalog service client
//!
//! Wraps the TMDB-style catalog API behind the `CatalogService` trait so the
//! pipeline and profile store can be driven by fakes in tests. Two
//! endpoints are consumed:
//!
//! 1. Discovery: /discover/{kind} with filters, one page at a time
//! 2. Details: /{kind}/{id}?append_to_response=credits
//!
//! Neither call caches or retries; a failed page or lookup is the caller's
//! problem to absorb.

use chrono::NaiveDate;
use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{DiscoverPage, MediaDetails, MediaKind},
};

/// Filter set for a discovery query
///
/// Recognized filters get typed fields; anything else rides along opaquely
/// in `extra` and is passed to the catalog untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverFilters {
    pub sort_by: Option<String>,
    pub with_original_language: Option<String>,
    pub vote_count_gte: Option<u32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub extra: Vec<(String, String)>,
}

impl DiscoverFilters {
    /// Filter set sorted by catalog popularity descending
    pub fn by_popularity() -> Self {
        Self {
            sort_by: Some("popularity.desc".to_string()),
            ..Default::default()
        }
    }

    /// Render the filters as query pairs for a discovery request.
    ///
    /// The date-range parameter names differ by kind: films filter on the
    /// primary release date, series on the first air date.
    fn to_query(&self, kind: MediaKind) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(sort_by) = &self.sort_by {
            query.push(("sort_by".to_string(), sort_by.clone()));
        }
        if let Some(languages) = &self.with_original_language {
            query.push(("with_original_language".to_string(), languages.clone()));
        }
        if let Some(votes) = self.vote_count_gte {
            query.push(("vote_count.gte".to_string(), votes.to_string()));
        }
        let (from_key, to_key) = match kind {
            MediaKind::Movie => ("primary_release_date.gte", "primary_release_date.lte"),
            MediaKind::Tv => ("first_air_date.gte", "first_air_date.lte"),
        };
        if let Some(from) = self.date_from {
            query.push((from_key.to_string(), from.to_string()));
        }
        if let Some(to) = self.date_to {
            query.push((to_key.to_string(), to.to_string()));
        }
        for (key, value) in &self.extra {
            query.push((key.clone(), value.clone()));
        }
        query
    }
}

/// Trait for catalog data access
///
/// `Send + Sync` so implementations can be shared across concurrently
/// issued lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch one page of discovery results for a kind and filter set
    async fn discover(
        &self,
        kind: MediaKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> AppResult<DiscoverPage>;

    /// Fetch full details for one item, credits included
    async fn details(&self, id: u64, kind: MediaKind) -> AppResult<MediaDetails>;
}

/// TMDB-backed catalog client
#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.catalog_api_key.clone(), config.catalog_api_url.clone())
    }
}

#[async_trait::async_trait]
impl CatalogService for TmdbCatalog {
    async fn discover(
        &self,
        kind: MediaKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> AppResult<DiscoverPage> {
        if page == 0 {
            return Err(AppError::InvalidInput(
                "Discovery pages are numbered from 1".to_string(),
            ));
        }

        let url = format!("{}/discover/{}", self.api_url, kind);
        let mut query = filters.to_query(kind);
        query.push(("api_key".to_string(), self.api_key.clone()));
        query.push(("page".to_string(), page.to_string()));

        tracing::debug!(kind = %kind, page = page, "Fetching discovery page");

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        let discover_page: DiscoverPage = response.json().await?;

        tracing::debug!(
            kind = %kind,
            page = discover_page.page,
            total_pages = discover_page.total_pages,
            results = discover_page.results.len(),
            "Discovery page fetched"
        );

        Ok(discover_page)
    }

    async fn details(&self, id: u64, kind: MediaKind) -> AppResult<MediaDetails> {
        let url = format!("{}/{}/{}", self.api_url, kind, id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        let details: MediaDetails = response.json().await?;

        tracing::debug!(id = id, kind = %kind, "Details fetched");

        Ok(details)
    }
}
