use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::ProfileRepository,
    error::AppResult,
    models::{AttributeWeights, ItemAttributes, MediaKind, TasteProfile, WatchStatus},
    services::catalog::CatalogService,
};

/// Owner of the current user's taste profile
///
/// Callers get read-only snapshots; the only mutations are status
/// transitions reported by the watchlist collaborator, a wholesale install
/// (hydration or bulk build), and clearing on sign-out. Every transition
/// persists the updated profile; a persistence failure is surfaced to the
/// caller while the in-memory state keeps the change, so the next
/// successful write carries the accumulated state forward.
pub struct ProfileStore {
    user_id: String,
    profile: RwLock<TasteProfile>,
    weights: AttributeWeights,
    catalog: Arc<dyn CatalogService>,
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileStore {
    pub fn new(
        user_id: String,
        catalog: Arc<dyn CatalogService>,
        repository: Arc<dyn ProfileRepository>,
        weights: AttributeWeights,
    ) -> Self {
        Self {
            user_id,
            profile: RwLock::new(TasteProfile::default()),
            weights,
            catalog,
            repository,
        }
    }

    /// Owned copy of the current profile
    pub async fn snapshot(&self) -> TasteProfile {
        self.profile.read().await.clone()
    }

    /// Replace the profile wholesale (session hydration or bulk build)
    pub async fn install(&self, profile: TasteProfile) {
        *self.profile.write().await = profile;
    }

    /// Reset the in-memory profile to empty; idempotent, does not touch
    /// persistence
    pub async fn clear(&self) {
        self.profile.write().await.clear();
    }

    /// Fold one watchlist status transition into the profile.
    ///
    /// The item's categorical attributes are resolved via a detail lookup,
    /// then the previous status's contribution is reversed and the new
    /// status's contribution applied. Reverse-then-apply, never a delta of
    /// magnitudes: the item may have entered the profile under a different
    /// status than the one now being replaced. Both folds happen inside a
    /// single write guard with no await, so rapid consecutive transitions
    /// cannot interleave a read-modify-write.
    ///
    /// A failed detail lookup is absorbed: the transition contributes
    /// nothing and the caller sees `Ok`. A failed persistence write is
    /// returned as `Err` with the in-memory change retained.
    pub async fn apply_transition(
        &self,
        media_id: u64,
        kind: MediaKind,
        new_status: WatchStatus,
        previous_status: WatchStatus,
    ) -> AppResult<()> {
        if new_status == previous_status {
            tracing::debug!(id = media_id, kind = %kind, "Transition to same status ignored");
            return Ok(());
        }

        let details = match self.catalog.details(media_id, kind).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    id = media_id,
                    kind = %kind,
                    "Detail lookup failed, transition contributes nothing"
                );
                return Ok(());
            }
        };
        let attrs = ItemAttributes::from_details(&details);

        let snapshot = {
            let mut profile = self.profile.write().await;
            profile.apply(&attrs, -previous_status.contribution(), &self.weights);
            profile.apply(&attrs, new_status.contribution(), &self.weights);
            profile.clone()
        };

        tracing::info!(
            id = media_id,
            kind = %kind,
            new_status = ?new_status,
            previous_status = ?previous_status,
            "Taste profile updated"
        );

        if let Err(e) = self.repository.save(&self.user_id, &snapshot).await {
            tracing::warn!(error = %e, user_id = %self.user_id, "Profile persistence failed, in-memory state retained");
            return Err(e);
        }

        Ok(())
    }

    pub fn weights(&self) -> &AttributeWeights {
        &self.weights
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::profile_store::MockProfileRepository;
    use crate::error::AppError;
    use crate::models::MediaDetails;
    use crate::services::catalog::MockCatalogService;

    fn sample_details() -> MediaDetails {
        serde_json::from_str(
            r#"{
                "id": 550,
                "title": "Fight Club",
                "genres": [{"id": 18, "name": "Drama"}, {"id": 53, "name": "Thriller"}],
                "original_language": "en",
                "production_countries": [{"iso_3166_1": "US"}],
                "credits": {
                    "cast": [{"id": 819}, {"id": 287}],
                    "crew": [{"id": 7467, "job": "Director"}]
                },
                "release_date": "1999-10-15"
            }"#,
        )
        .unwrap()
    }

    fn store_with(
        catalog: MockCatalogService,
        repository: MockProfileRepository,
    ) -> ProfileStore {
        ProfileStore::new(
            "user-1".to_string(),
            Arc::new(catalog),
            Arc::new(repository),
            AttributeWeights::default(),
        )
    }

    #[tokio::test]
    async fn test_transition_round_trip_restores_profile() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_details()
            .times(2)
            .returning(|_, _| Ok(sample_details()));
        let mut repository = MockProfileRepository::new();
        repository.expect_save().times(2).returning(|_, _| Ok(()));

        let store = store_with(catalog, repository);

        store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Watched, WatchStatus::Remove)
            .await
            .unwrap();
        assert!(!store.snapshot().await.is_empty());

        store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Remove, WatchStatus::Watched)
            .await
            .unwrap();
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_transition_reverses_previous_before_applying_new() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_details()
            .times(2)
            .returning(|_, _| Ok(sample_details()));
        let mut repository = MockProfileRepository::new();
        repository.expect_save().returning(|_, _| Ok(()));

        let store = store_with(catalog, repository);

        store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Watchlist, WatchStatus::Remove)
            .await
            .unwrap();
        store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Watched, WatchStatus::Watchlist)
            .await
            .unwrap();

        // Net effect equals a single watched contribution, not
        // watchlist + watched stacked
        let profile = store.snapshot().await;
        let weights = AttributeWeights::default();
        assert_eq!(
            profile.genres[&18],
            WatchStatus::Watched.contribution() * weights.genres
        );
    }

    #[tokio::test]
    async fn test_persistence_failure_retains_memory() {
        let mut catalog = MockCatalogService::new();
        catalog.expect_details().returning(|_, _| Ok(sample_details()));
        let mut repository = MockProfileRepository::new();
        repository
            .expect_save()
            .returning(|_, _| Err(AppError::Internal("store offline".to_string())));

        let store = store_with(catalog, repository);

        let result = store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Watched, WatchStatus::Remove)
            .await;
        assert!(result.is_err());
        assert!(!store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_detail_failure_is_absorbed() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_details()
            .returning(|_, _| Err(AppError::ExternalApi("catalog down".to_string())));
        // No save expected: the transition contributes nothing
        let repository = MockProfileRepository::new();

        let store = store_with(catalog, repository);

        let result = store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Watched, WatchStatus::Remove)
            .await;
        assert!(result.is_ok());
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_same_status_transition_is_ignored() {
        // No catalog call, no save
        let catalog = MockCatalogService::new();
        let repository = MockProfileRepository::new();

        let store = store_with(catalog, repository);
        store
            .apply_transition(550, MediaKind::Movie, WatchStatus::Watched, WatchStatus::Watched)
            .await
            .unwrap();
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let catalog = MockCatalogService::new();
        let repository = MockProfileRepository::new();
        let store = store_with(catalog, repository);

        let mut profile = TasteProfile::default();
        profile.genres.insert(28, 5.0);
        store.install(profile).await;
        assert!(!store.snapshot().await.is_empty());

        store.clear().await;
        store.clear().await;
        assert!(store.snapshot().await.is_empty());
    }
}
