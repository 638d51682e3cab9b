//! Gemeinsame Identifikations- und Rollentypen fuer Transkript
//!
//! Die externe Benutzer-ID verwendet das Newtype-Pattern, damit sie zur
//! Compilezeit nicht mit der internen numerischen ID verwechselt werden kann.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TranskriptError;

/// Externe, stabile Benutzer-ID (wird Clients gegenueber verwendet)
///
/// Wird vom Store beim Anlegen vergeben und nie wiederverwendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Erstellt eine neue zufaellige UserId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = TranskriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TranskriptError::UngueltigeBenutzerId(s.to_string()))
    }
}

/// Rolle eines Benutzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rolle {
    Admin,
    User,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    pub fn ist_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Default for Rolle {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

impl FromStr for Rolle {
    type Err = TranskriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(TranskriptError::UnbekannteRolle(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_sind_eindeutig() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn user_id_anzeige_und_parsen() {
        let id = UserId::new();
        let text = id.to_string();
        assert_eq!(text, id.inner().to_string());
        assert_eq!(text.parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn ungueltige_user_id() {
        let ergebnis = "keine-uuid".parse::<UserId>();
        assert!(matches!(
            ergebnis,
            Err(TranskriptError::UngueltigeBenutzerId(_))
        ));
    }

    #[test]
    fn rolle_serde_grossgeschrieben() {
        assert_eq!(serde_json::to_string(&Rolle::Admin).unwrap(), "\"ADMIN\"");
        let r: Rolle = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(r, Rolle::User);
    }

    #[test]
    fn rolle_parsen() {
        assert_eq!("ADMIN".parse::<Rolle>().unwrap(), Rolle::Admin);
        assert!("admin".parse::<Rolle>().is_err());
        assert!(Rolle::Admin.ist_admin());
        assert!(!Rolle::User.ist_admin());
    }
}
