use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};
use crate::models::TasteProfile;

/// Keys under which per-user profile state is persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileKey {
    /// Serialized taste profile for a user
    Profile(String),
    /// One-shot migration marker guarding the bulk profile build
    Migrated(String),
}

impl Display for ProfileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileKey::Profile(user_id) => write!(f, "profile:{}", user_id),
            ProfileKey::Migrated(user_id) => write!(f, "profile:migrated:{}", user_id),
        }
    }
}

/// Creates a Redis client for profile persistence
///
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Persisted envelope around the profile, stamped on every write
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    profile: TasteProfile,
    updated_at: DateTime<Utc>,
}

/// Trait for the profile persistence collaborator
///
/// An opaque per-user key-value store: the profile is read once at session
/// start and written after every transition and after a bulk build. The
/// migration marker records that the one-shot build has already run for a
/// user.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Load the persisted profile, `None` if the user has none yet
    async fn load(&self, user_id: &str) -> AppResult<Option<TasteProfile>>;

    /// Persist the current profile state
    async fn save(&self, user_id: &str, profile: &TasteProfile) -> AppResult<()>;

    /// Whether the bulk build already ran for this user
    async fn is_migrated(&self, user_id: &str) -> AppResult<bool>;

    /// Record that the bulk build ran for this user
    async fn mark_migrated(&self, user_id: &str) -> AppResult<()>;
}

/// Redis-backed profile repository
#[derive(Clone)]
pub struct RedisProfileRepository {
    redis_client: Client,
}

impl RedisProfileRepository {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait::async_trait]
impl ProfileRepository for RedisProfileRepository {
    async fn load(&self, user_id: &str) -> AppResult<Option<TasteProfile>> {
        let key = ProfileKey::Profile(user_id.to_string()).to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = conn.get(&key).await.map_err(|e| {
            tracing::warn!(error = %e, user_id = %user_id, "Profile load failed");
            e
        })?;

        match raw {
            Some(json) => {
                let stored: StoredProfile = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Profile deserialization error: {}", e))
                })?;
                tracing::debug!(user_id = %user_id, updated_at = %stored.updated_at, "Profile loaded");
                Ok(Some(stored.profile))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, user_id: &str, profile: &TasteProfile) -> AppResult<()> {
        let key = ProfileKey::Profile(user_id.to_string()).to_string();
        let stored = StoredProfile {
            profile: profile.clone(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&stored)
            .map_err(|e| AppError::Internal(format!("Profile serialization error: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(&key, json).await.map_err(|e| {
            tracing::warn!(error = %e, user_id = %user_id, "Profile save failed");
            e
        })?;

        tracing::debug!(user_id = %user_id, "Profile persisted");
        Ok(())
    }

    async fn is_migrated(&self, user_id: &str) -> AppResult<bool> {
        let key = ProfileKey::Migrated(user_id.to_string()).to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }

    async fn mark_migrated(&self, user_id: &str) -> AppResult<()> {
        let key = ProfileKey::Migrated(user_id.to_string()).to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(&key, "1").await?;
        tracing::info!(user_id = %user_id, "Migration marker set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_key_formats() {
        assert_eq!(
            ProfileKey::Profile("user-1".to_string()).to_string(),
            "profile:user-1"
        );
        assert_eq!(
            ProfileKey::Migrated("user-1".to_string()).to_string(),
            "profile:migrated:user-1"
        );
    }

    #[test]
    fn test_stored_profile_round_trip() {
        let mut profile = TasteProfile::default();
        profile.genres.insert(28, 5.0);
        profile.languages.insert("ko".to_string(), 1.5);

        let stored = StoredProfile {
            profile: profile.clone(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&stored).unwrap();
        let restored: StoredProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.profile, profile);
    }
}
