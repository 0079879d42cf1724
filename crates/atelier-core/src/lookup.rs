use crate::error::Result;
use crate::store::ArtifactStore;
use crate::types::ArtifactTypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

// ---------------------------------------------------------------------------
// TypeInfo
// ---------------------------------------------------------------------------

/// Cached metadata for one artifact type: the stable identifier plus the slug
/// used to address its resolved content inside a context object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_id: ArtifactTypeId,
    pub slug: String,
}

// ---------------------------------------------------------------------------
// TypeLookupCache
// ---------------------------------------------------------------------------

/// Read-through cache over the store's artifact-type listing.
///
/// Loads every type in one shot on first use and serves lookups from memory
/// until the snapshot is older than `ttl`, then reloads. Injected as an
/// explicit collaborator; nothing here is ambient or process-global.
pub struct TypeLookupCache {
    store: Arc<dyn ArtifactStore>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

struct Snapshot {
    by_name: HashMap<String, TypeInfo>,
    loaded_at: Instant,
}

impl TypeLookupCache {
    pub fn new(store: Arc<dyn ArtifactStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// Look up an artifact type by its unique name. `None` means the store
    /// has no such type.
    pub async fn artifact_type_info(&self, name: &str) -> Result<Option<TypeInfo>> {
        {
            let guard = self.snapshot.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.loaded_at.elapsed() < self.ttl {
                    return Ok(snapshot.by_name.get(name).cloned());
                }
            }
        }
        let snapshot = self.refresh().await?;
        Ok(snapshot.get(name).cloned())
    }

    /// Drop the snapshot so the next lookup reloads from the store.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
    }

    async fn refresh(&self) -> Result<HashMap<String, TypeInfo>> {
        let types = self.store.artifact_types().await?;
        let by_name: HashMap<String, TypeInfo> = types
            .into_iter()
            .map(|t| {
                (
                    t.name,
                    TypeInfo {
                        type_id: t.id,
                        slug: t.slug,
                    },
                )
            })
            .collect();
        debug!(count = by_name.len(), "type lookup cache refreshed");

        let mut guard = self.snapshot.write().await;
        *guard = Some(Snapshot {
            by_name: by_name.clone(),
            loaded_at: Instant::now(),
        });
        Ok(by_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
