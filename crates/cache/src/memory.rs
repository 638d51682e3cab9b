//! In-Process-Cache mit TTL
//!
//! Eintraege liegen in einer `DashMap` und tragen ihre Ablaufzeit auf der
//! tokio-Uhr. Abgelaufene Eintraege werden beim Lesen entfernt; ein optionaler
//! Hintergrund-Task bereinigt periodisch den Rest.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;

use crate::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};

/// Standard-Intervall fuer den Cleanup-Task: 5 Minuten
const CLEANUP_INTERVALL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct Eintrag {
    wert: String,
    laeuft_ab: Instant,
}

/// In-Memory-Cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    eintraege: DashMap<String, Eintrag>,
}

impl MemoryCache {
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Startet den periodischen Cleanup-Task fuer den Cache
    pub fn neu_mit_cleanup(cache: Arc<Self>) -> Arc<Self> {
        let cache_klon = Arc::clone(&cache);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVALL).await;
                let entfernt = cache_klon.cleanup_abgelaufene();
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Cache-Eintraege bereinigt");
                }
            }
        });
        cache
    }

    /// Entfernt abgelaufene Eintraege und gibt deren Anzahl zurueck
    pub fn cleanup_abgelaufene(&self) -> usize {
        let jetzt = Instant::now();
        let mut entfernt = 0;
        self.eintraege.retain(|_, e| {
            let lebt = e.laeuft_ab > jetzt;
            if !lebt {
                entfernt += 1;
            }
            lebt
        });
        entfernt
    }

    /// Anzahl der gespeicherten Eintraege (inkl. noch nicht bereinigter)
    pub fn anzahl(&self) -> usize {
        self.eintraege.len()
    }
}

impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let jetzt = Instant::now();
        match self.eintraege.get(key) {
            None => return Ok(None),
            Some(e) if e.laeuft_ab > jetzt => return Ok(Some(e.wert.clone())),
            Some(_) => {}
        }

        self.eintraege.remove_if(key, |_, e| e.laeuft_ab <= jetzt);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let laeuft_ab = Instant::now()
            .checked_add(ttl)
            .ok_or(CacheError::UngueltigeLebensdauer(ttl))?;
        self.eintraege.insert(
            key.to_string(),
            Eintrag {
                wert: value,
                laeuft_ab,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.eintraege.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn setzen_und_lesen() {
        let cache = MemoryCache::default();
        cache
            .set("k", "wert".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("wert"));
        assert_eq!(cache.get("fehlt").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn eintrag_laeuft_ab() {
        let cache = MemoryCache::default();
        cache
            .set("k", "wert".into(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.anzahl(), 0, "Abgelaufener Eintrag wird beim Lesen entfernt");
    }

    #[tokio::test]
    async fn invalidieren() {
        let cache = MemoryCache::default();
        cache
            .set("k", "wert".into(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());

        // Unbekannter Schluessel ist kein Fehler
        cache.invalidate("nie-gesetzt").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_entfernt_nur_abgelaufene() {
        let cache = MemoryCache::default();
        cache.set("kurz", "a".into(), Duration::from_secs(1)).await.unwrap();
        cache.set("lang", "b".into(), Duration::from_secs(600)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.cleanup_abgelaufene(), 1);
        assert_eq!(cache.anzahl(), 1);
        assert!(cache.get("lang").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unendliche_lebensdauer_wird_abgelehnt() {
        let cache = MemoryCache::default();
        let err = cache
            .set("k", "v".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::UngueltigeLebensdauer(_)));
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cleanup_neben_schreibenden_tasks() {
        let cache = MemoryCache::neu();
        let mut schreiber = Vec::new();
        for t in 0..3 {
            let cache = Arc::clone(&cache);
            schreiber.push(tokio::spawn(async move {
                for i in 0..2_000 {
                    cache
                        .set(&format!("{t}:{i}"), "v".into(), Duration::from_secs(60))
                        .await
                        .unwrap();
                }
            }));
        }

        let bereiniger = {
            let cache = Arc::clone(&cache);
            tokio::task::spawn_blocking(move || {
                let mut summe = 0;
                for _ in 0..500 {
                    summe += cache.cleanup_abgelaufene();
                }
                summe
            })
        };

        for s in schreiber {
            s.await.unwrap();
        }
        // Nichts ist abgelaufen, also wird auch nichts gezaehlt
        assert_eq!(bereiniger.await.unwrap(), 0);
        assert_eq!(cache.anzahl(), 6_000);
    }

    #[tokio::test]
    async fn arc_ist_backend() {
        let cache = MemoryCache::neu();
        CacheBackend::set(&cache, "k", "v".into(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
