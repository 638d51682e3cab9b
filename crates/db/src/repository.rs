//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Der Cache-Layer implementiert dieselben Traits
//! und kann deshalb transparent vor jeden Store gesetzt werden.

use std::time::Duration;

use chrono::{DateTime, Utc};
use transkript_core::UserId;

use crate::error::DbError;
use crate::models::{BenachrichtigungRecord, BenutzerRecord, BenutzerUpdate, NeuerBenutzer};

/// Result-Alias fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Zeitgrenzen fuer schreibende Transaktionen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransaktionsGrenzen {
    /// Maximale Wartezeit auf Verbindung bzw. Sperre
    pub max_wartezeit: Duration,
    /// Maximale Gesamtdauer einer Transaktion
    pub max_dauer: Duration,
}

impl Default for TransaktionsGrenzen {
    fn default() -> Self {
        Self {
            max_wartezeit: Duration::from_millis(1000),
            max_dauer: Duration::from_millis(3000),
        }
    }
}

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://transkript.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
    /// Zeitgrenzen fuer Transaktionen
    pub grenzen: TransaktionsGrenzen,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://transkript.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
            grenzen: TransaktionsGrenzen::default(),
        }
    }
}

/// Repository fuer Benutzer-Datenzugriffe
///
/// Schreibende Operationen liefern den Datensatz nach der Aenderung zurueck,
/// `delete` den geloeschten Datensatz (fuer Benachrichtigungstexte).
#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    /// Legt einen Benutzer an; doppelte E-Mail ergibt `DbError::Eindeutigkeit`
    async fn create(&self, data: NeuerBenutzer) -> DbResult<BenutzerRecord>;

    async fn get_by_id(&self, id: i64) -> DbResult<Option<BenutzerRecord>>;

    async fn get_by_external_id(&self, user_id: UserId) -> DbResult<Option<BenutzerRecord>>;

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Aendert die gesetzten Felder; unbekannte ID ergibt `DbError::NichtGefunden`
    async fn update(&self, user_id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord>;

    /// Setzt den Login-Zeitstempel, ohne `updated_at` zu veraendern
    async fn update_last_login(&self, user_id: UserId) -> DbResult<BenutzerRecord>;

    /// Loescht den Benutzer und gibt den geloeschten Datensatz zurueck
    async fn delete(&self, user_id: UserId) -> DbResult<BenutzerRecord>;

    /// Alle Benutzer, aufsteigend nach interner ID
    async fn list(&self) -> DbResult<Vec<BenutzerRecord>>;
}

/// Repository fuer die dauerhafte Ablage von Benachrichtigungen
#[allow(async_fn_in_trait)]
pub trait NotificationRepository: Send + Sync {
    async fn append(
        &self,
        message: &str,
        zeitpunkt: DateTime<Utc>,
    ) -> DbResult<BenachrichtigungRecord>;

    /// Neueste Benachrichtigungen zuerst
    async fn list_recent(&self, limit: i64) -> DbResult<Vec<BenachrichtigungRecord>>;
}
