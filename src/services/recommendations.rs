use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        watchlist_key, AttributeWeights, DiscoverItem, ItemAttributes, MediaKind, Recommendation,
        TasteProfile,
    },
    services::{
        catalog::{CatalogService, DiscoverFilters},
        watchlist::WatchlistSource,
    },
};

/// Tunable constants of the staged pipeline
///
/// Both values are policy, not physical law: five popularity-sorted pages
/// keep the candidate pool around a few hundred rows, and the 2.5x
/// promising-set multiplier leaves headroom for candidates that detailed
/// scoring (director and cast, unavailable cheaply) will discard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationPolicy {
    /// Discovery pages fetched per run
    pub discovery_pages: u32,
    /// Promising-set cap as a multiple of the requested count
    pub promising_multiplier: f64,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            discovery_pages: 5,
            promising_multiplier: 2.5,
        }
    }
}

/// Generates personalized recommendations from the current taste profile
///
/// Stateless between calls: each run is a pure function of the profile
/// snapshot it is handed and the catalog's current state. The ranking is
/// staged so the expensive detail lookups are bounded:
///
/// 1. Cheap discovery rows are pooled, deduplicated and pre-scored
/// 2. Only the promising set gets detail lookups and final scoring
///
/// No error aborts a run; every stage degrades to fewer or zero results.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogService>,
    watchlist: Arc<dyn WatchlistSource>,
    policy: RecommendationPolicy,
    weights: AttributeWeights,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        watchlist: Arc<dyn WatchlistSource>,
        policy: RecommendationPolicy,
        weights: AttributeWeights,
    ) -> Self {
        Self {
            catalog,
            watchlist,
            policy,
            weights,
        }
    }

    /// Upper bound of the promising set for a requested count
    pub fn promising_cap(&self, count: usize) -> usize {
        (count as f64 * self.policy.promising_multiplier).ceil() as usize
    }

    /// Produce up to `count` recommendations of the given kind, strictly
    /// descending by final score.
    ///
    /// An empty profile returns an empty list without touching the catalog.
    pub async fn recommend(
        &self,
        profile: &TasteProfile,
        kind: MediaKind,
        count: usize,
    ) -> AppResult<Vec<Recommendation>> {
        if profile.is_empty() || count == 0 {
            tracing::debug!(kind = %kind, "Empty profile or zero count, skipping recommendation run");
            return Ok(Vec::new());
        }

        let filters = self.derive_filters(profile);
        // Without the watchlist snapshot, already-seen items cannot be
        // excluded; an empty run is the only acceptable degradation
        let seen = match self.watchlist.entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Watchlist snapshot unavailable, returning no results");
                return Ok(Vec::new());
            }
        };

        let pool = self.assemble_pool(kind, &filters).await;
        let pool_size = pool.len();

        // Preliminary scoring over cheap discovery fields only
        let mut preliminary: Vec<(DiscoverItem, f64)> = pool
            .into_iter()
            .filter(|item| !seen.contains_key(&watchlist_key(item.kind_or(kind), item.id)))
            .filter_map(|item| {
                let attrs = ItemAttributes::from_discover(&item);
                let score = profile.affinity(&attrs, &self.weights);
                (score > 0.0).then_some((item, score))
            })
            .collect();
        preliminary.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        preliminary.truncate(self.promising_cap(count));

        tracing::info!(
            kind = %kind,
            pool = pool_size,
            promising = preliminary.len(),
            "Preliminary scoring complete"
        );

        let mut ranked = self.score_detailed(profile, kind, preliminary).await;
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(count);

        tracing::info!(kind = %kind, recommendations = ranked.len(), "Recommendation run complete");

        Ok(ranked)
    }

    /// Derive the discovery filter set from the profile: popularity
    /// descending, restricted to languages the user has positive affinity
    /// for (none means no restriction)
    fn derive_filters(&self, profile: &TasteProfile) -> DiscoverFilters {
        let mut filters = DiscoverFilters::by_popularity();
        let languages = profile.positive_languages();
        if !languages.is_empty() {
            filters.with_original_language = Some(languages.join("|"));
        }
        filters
    }

    /// Fetch discovery pages sequentially and merge them into a pool
    /// deduplicated by id.
    ///
    /// Pages are awaited one at a time because the stop condition
    /// (`page >= total_pages`) is only known after each page resolves. A
    /// failed page contributes nothing. On duplicate ids the last
    /// occurrence wins while keeping the first occurrence's position, so
    /// pool order stays deterministic.
    async fn assemble_pool(&self, kind: MediaKind, filters: &DiscoverFilters) -> Vec<DiscoverItem> {
        let mut order: Vec<u64> = Vec::new();
        let mut by_id: HashMap<u64, DiscoverItem> = HashMap::new();

        for page in 1..=self.policy.discovery_pages {
            match self.catalog.discover(kind, filters, page).await {
                Ok(discover_page) => {
                    for item in discover_page.results {
                        if !by_id.contains_key(&item.id) {
                            order.push(item.id);
                        }
                        by_id.insert(item.id, item);
                    }
                    if discover_page.page >= discover_page.total_pages {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, kind = %kind, page = page, "Discovery page failed");
                }
            }
        }

        order
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect()
    }

    /// Fetch details for the promising set concurrently and score each
    /// resolved candidate over its full attribute bundle.
    ///
    /// Per-candidate failures are isolated: a failed lookup silently drops
    /// that candidate. Detailed scores supersede preliminary scores
    /// entirely; non-positive finals are discarded.
    async fn score_detailed(
        &self,
        profile: &TasteProfile,
        kind: MediaKind,
        promising: Vec<(DiscoverItem, f64)>,
    ) -> Vec<Recommendation> {
        let mut tasks = Vec::new();
        for (item, _preliminary) in promising {
            let catalog = Arc::clone(&self.catalog);
            let item_kind = item.kind_or(kind);
            let task = tokio::spawn(async move { catalog.details(item.id, item_kind).await });
            tasks.push(task);
        }

        let mut ranked = Vec::new();
        let mut failed = 0usize;

        for task in tasks {
            match task.await {
                Ok(Ok(details)) => {
                    let attrs = ItemAttributes::from_details(&details);
                    let score = profile.affinity(&attrs, &self.weights);
                    if score > 0.0 {
                        ranked.push(Recommendation {
                            kind: details.kind(),
                            score,
                            details,
                        });
                    }
                }
                Ok(Err(e)) => {
                    failed += 1;
                    tracing::warn!(error = %e, "Detail lookup failed, candidate dropped");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(error = %e, "Task join error during detailed scoring");
                }
            }
        }

        if failed > 0 {
            tracing::warn!(
                success_count = ranked.len(),
                error_count = failed,
                "Partial detail fetch failure during detailed scoring"
            );
        }

        ranked
    }
}
