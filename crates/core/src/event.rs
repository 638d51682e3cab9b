//! Lebenszyklus-Ereignisse fuer Benutzer
//!
//! Diese Ereignisse werden nach einer erfolgreichen Benutzeraktion
//! erzeugt und asynchron an die Benachrichtigungs-Senke uebergeben.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Art eines Lebenszyklus-Ereignisses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EreignisArt {
    #[serde(rename = "user.created")]
    Erstellt,
    #[serde(rename = "user.updated")]
    Aktualisiert,
    #[serde(rename = "user.deleted")]
    Geloescht,
}

impl EreignisArt {
    /// Stabiler Name des Ereignisses (z.B. "user.created")
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Erstellt => "user.created",
            Self::Aktualisiert => "user.updated",
            Self::Geloescht => "user.deleted",
        }
    }
}

/// Ein Lebenszyklus-Ereignis eines Benutzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerEreignis {
    pub art: EreignisArt,
    pub user_id: UserId,
    pub email: String,
    pub zeitpunkt: DateTime<Utc>,
}

impl BenutzerEreignis {
    pub fn neu(art: EreignisArt, user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            art,
            user_id,
            email: email.into(),
            zeitpunkt: Utc::now(),
        }
    }

    /// Nachrichtentext fuer die Benachrichtigungs-Senke
    pub fn nachricht(&self) -> String {
        match self.art {
            EreignisArt::Erstellt => format!("Neuer Benutzer registriert: {}", self.email),
            EreignisArt::Aktualisiert => format!("Benutzer aktualisiert: {}", self.email),
            EreignisArt::Geloescht => format!("Benutzer geloescht: {}", self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ist_serde_kompatibel() {
        let event = BenutzerEreignis::neu(EreignisArt::Erstellt, UserId::new(), "a@x.com");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"user.created\""));
        let zurueck: BenutzerEreignis = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, event);
    }

    #[test]
    fn nachrichtentexte() {
        let id = UserId::new();
        let e = BenutzerEreignis::neu(EreignisArt::Geloescht, id, "b@x.com");
        assert_eq!(e.nachricht(), "Benutzer geloescht: b@x.com");
        assert_eq!(e.art.als_str(), "user.deleted");
    }
}
