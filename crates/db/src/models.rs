//! Datenbankmodelle fuer Transkript
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Antwort-Typen des Auth-Crates getrennt und dienen als
//! reine Datenuebertragungsobjekte. Der Passwort-Hash verlaesst dieses Crate
//! nur in Richtung Cache und Passwortpruefung.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transkript_core::{Rolle, UserId};

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerRecord {
    /// Interne, vom Store vergebene ID
    pub id: i64,
    /// Externe, stabile ID
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Rolle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub login_at: Option<DateTime<Utc>>,
}

// Der Hash taucht nie in Debug-Ausgaben (und damit nie in Logs) auf
impl std::fmt::Debug for BenutzerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenutzerRecord")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"<verborgen>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("login_at", &self.login_at)
            .finish()
    }
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Rolle,
}

/// Daten zum Aktualisieren eines Benutzers (nur gesetzte Felder werden geaendert)
#[derive(Debug, Clone, Default)]
pub struct BenutzerUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Rolle>,
}

impl BenutzerUpdate {
    /// Gibt `true` zurueck wenn kein Feld gesetzt ist
    pub fn ist_leer(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

// ---------------------------------------------------------------------------
// Benachrichtigungen
// ---------------------------------------------------------------------------

/// Persistierte Benachrichtigung
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenachrichtigungRecord {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
