//! Fehlertypen fuer den Cache-Layer
//!
//! Diese Fehler verlassen das Crate nie Richtung Aufrufer des Repositories:
//! `CachingUserRepository` protokolliert sie und greift auf den Store durch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache nicht erreichbar: {0}")]
    NichtErreichbar(String),

    #[error("Lebensdauer nicht darstellbar: {0:?}")]
    UngueltigeLebensdauer(std::time::Duration),

    #[error("Cache-Eintrag nicht (de)serialisierbar: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

/// Result-Alias fuer Cache-Operationen
pub type CacheResult<T> = Result<T, CacheError>;
