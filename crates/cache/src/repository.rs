//! Cache-Aside-Repository
//!
//! `CachingUserRepository` umhuellt ein beliebiges `UserRepository` und
//! implementiert dieselbe Schnittstelle:
//!
//! - Lesen: Cache-Treffer direkt zurueckgeben, bei Miss aus dem Store laden
//!   und mit TTL in den Cache schreiben
//! - Schreiben: erst den Store aendern, dann die betroffenen Eintraege
//!   ueberschreiben bzw. invalidieren, bevor das Ergebnis zurueckgeht
//! - Cache-Fehler werden protokolliert und wie ein Miss behandelt

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use transkript_core::UserId;
use transkript_db::{
    BenutzerRecord, BenutzerUpdate, DbError, DbResult, NeuerBenutzer, UserRepository,
};

use crate::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};
use crate::schluessel;

/// Lebensdauern der Cache-Eintraege
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL fuer Listen (Standard: 60 s)
    pub liste_ttl: Duration,
    /// TTL fuer einzelne Datensaetze (Standard: 300 s)
    pub eintrag_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            liste_ttl: Duration::from_secs(60),
            eintrag_ttl: Duration::from_secs(300),
        }
    }
}

/// Cache-Aside-Layer vor einem `UserRepository`
pub struct CachingUserRepository<R, C> {
    innen: R,
    cache: C,
    config: CacheConfig,
}

impl<R: UserRepository, C: CacheBackend> CachingUserRepository<R, C> {
    pub fn neu(innen: R, cache: C, config: CacheConfig) -> Self {
        Self {
            innen,
            cache,
            config,
        }
    }

    /// Zugriff auf den umhuellten Store (umgeht den Cache)
    pub fn innen(&self) -> &R {
        &self.innen
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    // --- Interne Hilfsmethoden ---

    async fn lesen<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(json)) => match dekodieren(&json) {
                Ok(wert) => {
                    debug!(key, "Cache-Treffer");
                    Some(wert)
                }
                Err(e) => {
                    warn!(key, fehler = %e, "Cache-Eintrag nicht lesbar, wird verworfen");
                    self.entfernen(key).await;
                    None
                }
            },
            Ok(None) => {
                debug!(key, "Cache-Miss");
                None
            }
            Err(e) => {
                warn!(key, fehler = %e, "Cache nicht verfuegbar, Durchgriff auf Store");
                None
            }
        }
    }

    async fn schreiben<T: Serialize>(&self, key: &str, wert: &T, ttl: Duration) {
        let json = match kodieren(wert) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, fehler = %e, "Cache-Eintrag nicht serialisierbar");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, json, ttl).await {
            warn!(key, fehler = %e, "Cache-Eintrag konnte nicht geschrieben werden");
        }
    }

    async fn entfernen(&self, key: &str) {
        if let Err(e) = self.cache.invalidate(key).await {
            warn!(key, fehler = %e, "Cache-Eintrag konnte nicht invalidiert werden");
        }
    }

    /// Legt beide Datensatz-Schluessel (E-Mail und externe ID) an
    async fn datensatz_merken(&self, record: &BenutzerRecord) {
        let ttl = self.config.eintrag_ttl;
        self.schreiben(&schluessel::benutzer_email(&record.email), record, ttl)
            .await;
        self.schreiben(&schluessel::benutzer_id(record.user_id), record, ttl)
            .await;
    }

    async fn datensatz_vergessen(&self, record: &BenutzerRecord) {
        self.entfernen(&schluessel::benutzer_email(&record.email))
            .await;
        self.entfernen(&schluessel::benutzer_id(record.user_id)).await;
    }

    async fn liste_vergessen(&self) {
        self.entfernen(schluessel::ALLE_BENUTZER).await;
    }
}

fn kodieren<T: Serialize>(wert: &T) -> CacheResult<String> {
    serde_json::to_string(wert).map_err(CacheError::from)
}

fn dekodieren<T: DeserializeOwned>(json: &str) -> CacheResult<T> {
    serde_json::from_str(json).map_err(CacheError::from)
}

impl<R: UserRepository, C: CacheBackend> UserRepository for CachingUserRepository<R, C> {
    async fn create(&self, data: NeuerBenutzer) -> DbResult<BenutzerRecord> {
        let record = self.innen.create(data).await?;
        self.datensatz_merken(&record).await;
        self.liste_vergessen().await;
        Ok(record)
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Option<BenutzerRecord>> {
        self.innen.get_by_id(id).await
    }

    async fn get_by_external_id(&self, user_id: UserId) -> DbResult<Option<BenutzerRecord>> {
        let key = schluessel::benutzer_id(user_id);
        if let Some(record) = self.lesen::<BenutzerRecord>(&key).await {
            return Ok(Some(record));
        }

        let record = self.innen.get_by_external_id(user_id).await?;
        if let Some(ref r) = record {
            self.datensatz_merken(r).await;
        }
        Ok(record)
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        let key = schluessel::benutzer_email(email);
        if let Some(record) = self.lesen::<BenutzerRecord>(&key).await {
            return Ok(Some(record));
        }

        let record = self.innen.get_by_email(email).await?;
        if let Some(ref r) = record {
            self.datensatz_merken(r).await;
        }
        Ok(record)
    }

    async fn update(&self, user_id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
        // Alte E-Mail direkt aus dem Store, der Cache koennte veraltet sein
        let vorher = self.innen.get_by_external_id(user_id).await?;

        let ergebnis = self.innen.update(user_id, data).await;
        let record = match ergebnis {
            Ok(record) => record,
            Err(e @ DbError::NichtGefunden(_)) => {
                self.entfernen(&schluessel::benutzer_id(user_id)).await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Some(alt) = vorher.filter(|alt| alt.email != record.email) {
            self.entfernen(&schluessel::benutzer_email(&alt.email)).await;
        }
        self.datensatz_merken(&record).await;
        self.liste_vergessen().await;
        Ok(record)
    }

    async fn update_last_login(&self, user_id: UserId) -> DbResult<BenutzerRecord> {
        let record = self.innen.update_last_login(user_id).await?;
        self.datensatz_merken(&record).await;
        self.liste_vergessen().await;
        Ok(record)
    }

    async fn delete(&self, user_id: UserId) -> DbResult<BenutzerRecord> {
        match self.innen.delete(user_id).await {
            Ok(record) => {
                self.datensatz_vergessen(&record).await;
                self.liste_vergessen().await;
                Ok(record)
            }
            Err(e) => {
                if matches!(e, DbError::NichtGefunden(_)) {
                    self.entfernen(&schluessel::benutzer_id(user_id)).await;
                }
                Err(e)
            }
        }
    }

    async fn list(&self) -> DbResult<Vec<BenutzerRecord>> {
        if let Some(alle) = self.lesen::<Vec<BenutzerRecord>>(schluessel::ALLE_BENUTZER).await {
            return Ok(alle);
        }

        let alle = self.innen.list().await?;
        self.schreiben(schluessel::ALLE_BENUTZER, &alle, self.config.liste_ttl)
            .await;
        Ok(alle)
    }
}
