//! Schnittstelle fuer Cache-Backends
//!
//! Werte sind serialisierte Strings, damit ein Netzwerk-Cache dieselbe
//! Schnittstelle bedienen kann wie der In-Process-Cache.

use std::{sync::Arc, time::Duration};

use crate::error::CacheResult;

#[allow(async_fn_in_trait)]
pub trait CacheBackend: Send + Sync {
    /// Liefert den Wert oder `None` bei Miss bzw. abgelaufenem Eintrag
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    async fn invalidate(&self, key: &str) -> CacheResult<()>;
}

// Erlaubt z.B. `Arc<MemoryCache>` direkt als Backend
impl<C: CacheBackend> CacheBackend for Arc<C> {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        C::get(self, key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        C::set(self, key, value, ttl).await
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        C::invalidate(self, key).await
    }
}
