//! Generation-tracked cache for the hook table.
//!
//! The table is built once, kept in process and mirrored to the shared
//! cache. Only [`HookTableCache::invalidate`] forces a rebuild.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use plughost_cache::CacheManager;
use plughost_cache::keys;
use plughost_core::traits::cache::CacheProvider;

use super::table::HookTable;

#[derive(Debug)]
pub struct HookTableCache {
    cache: CacheManager,
    generation: AtomicU64,
    current: RwLock<Option<Arc<HookTable>>>,
}

impl HookTableCache {
    pub fn new(cache: CacheManager) -> Self {
        Self {
            cache,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The in-process table, if one is loaded for the current generation.
    pub async fn current(&self) -> Option<Arc<HookTable>> {
        let generation = self.generation();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|t| t.generation == generation)
            .cloned()
    }

    /// Returns the table for the current generation: in-process copy first,
    /// then the shared cache, then `build`. Cache failures are logged and
    /// fall through to building.
    pub async fn get_or_build<F>(&self, build: F) -> Arc<HookTable>
    where
        F: FnOnce(u64) -> HookTable,
    {
        if let Some(table) = self.current().await {
            return table;
        }

        let generation = self.generation();
        let key = keys::hook_table();

        let cached = match self.cache.get_json::<HookTable>(&key).await {
            Ok(cached) => cached.filter(|t| t.generation == generation),
            Err(e) => {
                warn!(key = %key, error = %e, "Hook table cache read failed");
                None
            }
        };

        let table = match cached {
            Some(table) => {
                debug!(generation, "Hook table loaded from cache");
                Arc::new(table)
            }
            None => {
                let table = Arc::new(build(generation));
                if let Err(e) = self.cache.set_json(&key, table.as_ref()).await {
                    warn!(key = %key, error = %e, "Hook table cache write failed");
                }
                debug!(generation, hooks = table.len(), "Hook table built");
                table
            }
        };

        *self.current.write().await = Some(table.clone());
        table
    }

    /// Drops the in-process and shared copies and bumps the generation.
    /// Returns the new generation.
    pub async fn invalidate(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.write().await = None;

        let key = keys::hook_table();
        if let Err(e) = self.cache.delete(&key).await {
            warn!(key = %key, error = %e, "Hook table cache delete failed");
        }
        generation
    }
}
