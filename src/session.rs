use std::sync::Arc;

use crate::{
    db::ProfileRepository,
    error::AppResult,
    models::{
        parse_watchlist_key, AttributeWeights, MediaKind, Recommendation, TasteProfile,
        WatchStatus,
    },
    services::{
        builder::{LibraryEntry, ProfileBuilder, ProgressObserver},
        catalog::CatalogService,
        profile::ProfileStore,
        recommendations::{RecommendationEngine, RecommendationPolicy},
        watchlist::WatchlistSource,
    },
};

/// Per-user session context owning the taste model and its pipelines
///
/// The profile is explicit session state, not an ambient singleton: it is
/// hydrated from persistence on sign-in, mutated by every watchlist
/// transition for the lifetime of the session, and reset (not deleted) on
/// sign-out.
pub struct Session {
    user_id: String,
    store: ProfileStore,
    builder: ProfileBuilder,
    engine: RecommendationEngine,
    watchlist: Arc<dyn WatchlistSource>,
    repository: Arc<dyn ProfileRepository>,
}

impl Session {
    /// Open a session for a user, hydrating the persisted profile.
    ///
    /// A user with no persisted profile starts empty.
    pub async fn sign_in(
        user_id: String,
        catalog: Arc<dyn CatalogService>,
        watchlist: Arc<dyn WatchlistSource>,
        repository: Arc<dyn ProfileRepository>,
        policy: RecommendationPolicy,
        weights: AttributeWeights,
    ) -> AppResult<Self> {
        let store = ProfileStore::new(
            user_id.clone(),
            Arc::clone(&catalog),
            Arc::clone(&repository),
            weights,
        );
        if let Some(profile) = repository.load(&user_id).await? {
            store.install(profile).await;
        }

        let builder = ProfileBuilder::new(Arc::clone(&catalog), weights);
        let engine = RecommendationEngine::new(
            catalog,
            Arc::clone(&watchlist),
            policy,
            weights,
        );

        tracing::info!(user_id = %user_id, "Session opened");

        Ok(Self {
            user_id,
            store,
            builder,
            engine,
            watchlist,
            repository,
        })
    }

    /// Snapshot of the current taste profile
    pub async fn profile(&self) -> TasteProfile {
        self.store.snapshot().await
    }

    /// React to a watchlist status transition reported by the collaborator
    pub async fn apply_transition(
        &self,
        media_id: u64,
        kind: MediaKind,
        new_status: WatchStatus,
        previous_status: WatchStatus,
    ) -> AppResult<()> {
        self.store
            .apply_transition(media_id, kind, new_status, previous_status)
            .await
    }

    /// Generate up to `count` recommendations against the current profile
    pub async fn recommend(
        &self,
        kind: MediaKind,
        count: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let profile = self.store.snapshot().await;
        self.engine.recommend(&profile, kind, count).await
    }

    /// One-shot migration: bulk-build the profile from the user's existing
    /// library.
    ///
    /// Guarded by the repository's migration marker; returns `false` when
    /// the build already ran for this user. The build is a full fold, so
    /// running it twice would double every contribution.
    pub async fn ensure_profile(&self, observer: &dyn ProgressObserver) -> AppResult<bool> {
        if self.repository.is_migrated(&self.user_id).await? {
            tracing::debug!(user_id = %self.user_id, "Profile already migrated");
            return Ok(false);
        }

        let entries: Vec<LibraryEntry> = self
            .watchlist
            .entries()
            .await?
            .into_iter()
            .filter_map(|(key, entry)| {
                let (kind, id) = parse_watchlist_key(&key)?;
                Some(LibraryEntry {
                    id,
                    kind,
                    status: entry.status,
                })
            })
            .collect();

        let profile = self.builder.build(&entries, observer).await;
        self.store.install(profile.clone()).await;
        self.repository.save(&self.user_id, &profile).await?;
        self.repository.mark_migrated(&self.user_id).await?;

        tracing::info!(user_id = %self.user_id, entries = entries.len(), "Profile migration complete");
        Ok(true)
    }

    /// Close the session: reset the in-memory profile to empty. The
    /// persisted profile is untouched.
    pub async fn sign_out(&self) {
        self.store.clear().await;
        tracing::info!(user_id = %self.user_id, "Session closed");
    }
}
