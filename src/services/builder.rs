use std::sync::Arc;

use crate::{
    models::{AttributeWeights, ItemAttributes, MediaKind, TasteProfile, WatchStatus},
    services::catalog::CatalogService,
};

/// Detail lookups issued concurrently per build batch
const DETAIL_BATCH_SIZE: usize = 10;

/// Observer for bulk-build progress events
///
/// Receives a percentage in [0, 100] and a phase label after every batch;
/// the final event is exactly 100 even when some lookups failed.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, percent: f32, phase: &str);
}

/// One item of the user's existing library, as fed to the bulk build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LibraryEntry {
    pub id: u64,
    pub kind: MediaKind,
    pub status: WatchStatus,
}

/// Bulk constructor for a taste profile
///
/// Folds a user's entire existing library into a fresh profile in one pass,
/// using the same per-status contribution as incremental transitions. No
/// transition history exists at build time, so each entry counts only under
/// its current status (previous status treated as `Remove`).
///
/// The builder is a pure fold: it neither persists the result nor guards
/// against running twice. Running it twice over an already-counted library
/// would double every contribution; the session's migration marker is the
/// guard.
pub struct ProfileBuilder {
    catalog: Arc<dyn CatalogService>,
    weights: AttributeWeights,
}

impl ProfileBuilder {
    pub fn new(catalog: Arc<dyn CatalogService>, weights: AttributeWeights) -> Self {
        Self { catalog, weights }
    }

    /// Build a profile from the full library, reporting progress per batch.
    ///
    /// Detail lookups run concurrently within each batch and are joined
    /// settle-all: a failed entry contributes nothing and never aborts the
    /// build.
    pub async fn build(
        &self,
        entries: &[LibraryEntry],
        observer: &dyn ProgressObserver,
    ) -> TasteProfile {
        let total = entries.len();
        let mut profile = TasteProfile::default();

        tracing::info!(entries = total, "Building taste profile from library");

        if total == 0 {
            observer.on_progress(100.0, "Profile built");
            return profile;
        }

        let mut processed = 0usize;
        let mut failed = 0usize;

        for batch in entries.chunks(DETAIL_BATCH_SIZE) {
            let mut tasks = Vec::new();
            for entry in batch {
                let catalog = Arc::clone(&self.catalog);
                let entry = *entry;
                let task = tokio::spawn(async move {
                    let details = catalog.details(entry.id, entry.kind).await;
                    (entry, details)
                });
                tasks.push(task);
            }

            for task in tasks {
                processed += 1;
                match task.await {
                    Ok((entry, Ok(details))) => {
                        let attrs = ItemAttributes::from_details(&details);
                        profile.apply(&attrs, entry.status.contribution(), &self.weights);
                    }
                    Ok((entry, Err(e))) => {
                        failed += 1;
                        tracing::warn!(
                            error = %e,
                            id = entry.id,
                            kind = %entry.kind,
                            "Detail lookup failed during profile build"
                        );
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::error!(error = %e, "Task join error during profile build");
                    }
                }
            }

            let percent = (processed as f32 / total as f32) * 100.0;
            observer.on_progress(percent, "Analyzing library");
        }

        if failed > 0 {
            tracing::warn!(
                success_count = total - failed,
                error_count = failed,
                "Partial detail fetch failure during profile build"
            );
        }

        observer.on_progress(100.0, "Profile built");

        tracing::info!(
            entries = total,
            failed = failed,
            empty = profile.is_empty(),
            "Taste profile build complete"
        );

        profile
    }
}
