//! Berechtigungs-Policy
//!
//! Reine Funktion ohne Zustand: ADMIN darf alles, ein Benutzer nur sich
//! selbst lesen, aendern und loeschen. Rollenwechsel sind ADMIN vorbehalten.

use transkript_core::{Rolle, UserId};

use crate::error::{AuthError, AuthResult};
use crate::models::Anfragender;

/// Vom Service ausgefuehrte Aktionen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aktion {
    Registrieren,
    Anmelden,
    Initialisieren,
    Auflisten,
    Laden,
    Aktualisieren,
    Loeschen,
    RolleAendern,
}

impl Aktion {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Registrieren => "registrieren",
            Self::Anmelden => "anmelden",
            Self::Initialisieren => "initialisieren",
            Self::Auflisten => "auflisten",
            Self::Laden => "laden",
            Self::Aktualisieren => "aktualisieren",
            Self::Loeschen => "loeschen",
            Self::RolleAendern => "rolle_aendern",
        }
    }
}

/// Entscheidet ob `anfragender_id` mit `rolle` die Aktion auf `ziel_id` ausfuehren darf
pub fn erlaubt(anfragender_id: UserId, rolle: Rolle, ziel_id: Option<UserId>, aktion: Aktion) -> bool {
    match aktion {
        Aktion::Registrieren | Aktion::Anmelden | Aktion::Initialisieren => true,
        Aktion::Auflisten | Aktion::RolleAendern => rolle.ist_admin(),
        Aktion::Laden | Aktion::Aktualisieren | Aktion::Loeschen => {
            rolle.ist_admin() || ziel_id == Some(anfragender_id)
        }
    }
}

/// Wie `erlaubt`, aber mit `Verboten` als Fehler
pub(crate) fn erfordern(
    anfragender: &Anfragender,
    ziel_id: Option<UserId>,
    aktion: Aktion,
) -> AuthResult<()> {
    if erlaubt(anfragender.user_id, anfragender.rolle, ziel_id, aktion) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %anfragender.user_id,
        aktion = aktion.als_str(),
        "Zugriff verweigert"
    );
    Err(AuthError::Verboten(format!(
        "Aktion '{}' nicht erlaubt",
        aktion.als_str()
    )))
}
