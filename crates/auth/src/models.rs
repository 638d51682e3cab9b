//! Ein- und Ausgabetypen des Identitaets-Service
//!
//! `BenutzerProfil` ist die einzige Benutzer-Darstellung, die den Service
//! verlaesst. Sie enthaelt weder den Passwort-Hash noch die interne ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use transkript_core::{Rolle, UserId};
use transkript_db::BenutzerRecord;

/// Oeffentliche Projektion eines Benutzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenutzerProfil {
    #[serde(rename = "externalId")]
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: Rolle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_at: Option<DateTime<Utc>>,
}

impl From<&BenutzerRecord> for BenutzerProfil {
    fn from(r: &BenutzerRecord) -> Self {
        Self {
            user_id: r.user_id,
            email: r.email.clone(),
            name: r.name.clone(),
            role: r.role,
            created_at: Some(r.created_at),
            updated_at: Some(r.updated_at),
            login_at: r.login_at,
        }
    }
}

/// Antwort auf Registrierung und Login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAntwort {
    #[serde(rename = "user")]
    pub benutzer: BenutzerProfil,
    pub token: String,
}

/// Identitaet des Anfragenden, aus einem geprueften Token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anfragender {
    pub user_id: UserId,
    pub rolle: Rolle,
}

// Klartext-Passwoerter erscheinen nie in Debug-Ausgaben
const VERBORGEN: &str = "<verborgen>";

/// Registrierungsdaten (neue Konten erhalten immer die Rolle USER)
#[derive(Clone, Deserialize)]
pub struct Registrierung {
    pub email: String,
    pub name: String,
    #[serde(rename = "password")]
    pub passwort: String,
}

impl std::fmt::Debug for Registrierung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrierung")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("passwort", &VERBORGEN)
            .finish()
    }
}

/// Login-Daten
#[derive(Clone, Deserialize)]
pub struct Anmeldung {
    pub email: String,
    #[serde(rename = "password")]
    pub passwort: String,
}

impl std::fmt::Debug for Anmeldung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anmeldung")
            .field("email", &self.email)
            .field("passwort", &VERBORGEN)
            .finish()
    }
}

/// Teilaenderung eines Profils (nur gesetzte Felder werden geaendert)
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfilUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "password")]
    pub passwort: Option<String>,
    pub role: Option<Rolle>,
}

impl std::fmt::Debug for ProfilUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilUpdate")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("passwort", &self.passwort.as_ref().map(|_| VERBORGEN))
            .field("role", &self.role)
            .finish()
    }
}

/// Konto, das beim Start sichergestellt wird
#[derive(Clone, Deserialize)]
pub struct BootstrapKonto {
    pub email: String,
    pub name: String,
    #[serde(rename = "password")]
    pub passwort: String,
    pub role: Rolle,
}

impl BootstrapKonto {
    pub fn standard_admin() -> Self {
        Self {
            email: "admin@example.com".into(),
            name: "Admin User".into(),
            passwort: "adminpassword".into(),
            role: Rolle::Admin,
        }
    }

    pub fn standard_test() -> Self {
        Self {
            email: "user@example.com".into(),
            name: "Test User".into(),
            passwort: "userpassword".into(),
            role: Rolle::User,
        }
    }
}

impl std::fmt::Debug for BootstrapKonto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapKonto")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("passwort", &VERBORGEN)
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profil_ohne_hash() {
        let jetzt = Utc::now();
        let record = BenutzerRecord {
            id: 7,
            user_id: UserId::new(),
            email: "a@x.com".into(),
            name: "A".into(),
            password_hash: "$argon2id$geheim".into(),
            role: Rolle::User,
            created_at: jetzt,
            updated_at: jetzt,
            login_at: None,
        };

        let json = serde_json::to_value(BenutzerProfil::from(&record)).unwrap();
        let text = json.to_string();
        assert!(!text.contains("geheim"));
        assert!(!text.to_lowercase().contains("password"));
        assert_eq!(json["externalId"], record.user_id.to_string());
        assert_eq!(json["role"], "USER");
        assert!(json.get("loginAt").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn debug_verbirgt_passwoerter() {
        let reg = Registrierung {
            email: "a@x.com".into(),
            name: "A".into(),
            passwort: "pw1".into(),
        };
        assert!(!format!("{reg:?}").contains("pw1"));

        let upd = ProfilUpdate {
            passwort: Some("neu123".into()),
            ..Default::default()
        };
        assert!(!format!("{upd:?}").contains("neu123"));
    }

    #[test]
    fn update_aus_json() {
        let upd: ProfilUpdate = serde_json::from_str(r#"{"name":"B","role":"ADMIN"}"#).unwrap();
        assert_eq!(upd.name.as_deref(), Some("B"));
        assert_eq!(upd.role, Some(Rolle::Admin));
        assert!(upd.email.is_none());
        assert!(upd.passwort.is_none());
    }
}
