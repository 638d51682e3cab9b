//! Fehlertypen fuer Transkript
//!
//! Fehler beim Parsen der gemeinsamen Typen. Die Fach-Crates definieren
//! eigene Fehler.

use thiserror::Error;

/// Ungueltige Eingaben fuer die gemeinsamen Typen
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranskriptError {
    #[error("Ungueltige Benutzer-ID: {0}")]
    UngueltigeBenutzerId(String),

    #[error("Unbekannte Rolle: {0}")]
    UnbekannteRolle(String),
}
