//! Fehlertypen fuer den Auth-Service

use thiserror::Error;
use transkript_db::DbError;

/// Einheitliche Meldung fuer unbekannte E-Mail und falsches Passwort
pub const ANMELDEDATEN_FALSCH: &str = "E-Mail oder Passwort falsch";

/// Einheitliche Meldung fuer fehlende, ungueltige oder abgelaufene Tokens
pub const TOKEN_UNGUELTIG: &str = "Token fehlt, ist ungueltig oder abgelaufen";

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Konflikt: {0}")]
    Konflikt(String),

    #[error("Nicht autorisiert: {0}")]
    NichtAutorisiert(String),

    #[error("Zugriff verweigert: {0}")]
    Verboten(String),

    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Dienst voruebergehend nicht verfuegbar: {0}")]
    NichtVerfuegbar(String),

    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn anmeldedaten_falsch() -> Self {
        Self::NichtAutorisiert(ANMELDEDATEN_FALSCH.into())
    }

    pub fn token_ungueltig() -> Self {
        Self::NichtAutorisiert(TOKEN_UNGUELTIG.into())
    }

    pub fn email_vergeben() -> Self {
        Self::Konflikt("Benutzer mit dieser E-Mail existiert bereits".into())
    }

    /// HTTP-Statuscode fuer Transport-Schichten
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Konflikt(_) => 409,
            Self::NichtAutorisiert(_) => 401,
            Self::Verboten(_) => 403,
            Self::NichtGefunden(_) => 404,
            Self::NichtVerfuegbar(_) => 503,
            Self::PasswortHashing(_) | Self::Intern(_) => 500,
        }
    }

    /// Stabiler numerischer Fehler-Code
    pub fn fehler_code(&self) -> u32 {
        match self {
            Self::NichtAutorisiert(_) => 1001,
            Self::Verboten(_) => 1002,
            Self::NichtGefunden(_) => 1004,
            Self::Konflikt(_) => 1009,
            Self::NichtVerfuegbar(_) => 2001,
            Self::PasswortHashing(_) => 5001,
            Self::Intern(_) => 5000,
        }
    }
}

// Manuelle Abbildung: Store-Details (SQL-Codes, Constraint-Namen) bleiben im Log
impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        if e.ist_eindeutigkeit() {
            return Self::email_vergeben();
        }
        if e.ist_zeitlimit() {
            tracing::warn!(fehler = %e, "Store-Zeitlimit ueberschritten");
            return Self::NichtVerfuegbar("Zeitlimit des Speichers ueberschritten".into());
        }
        match e {
            DbError::NichtGefunden(_) => Self::NichtGefunden("Benutzer nicht gefunden".into()),
            andere => {
                tracing::error!(fehler = %andere, "Datenbankfehler");
                Self::NichtVerfuegbar("Speicher nicht verfuegbar".into())
            }
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_fehler_abbildung() {
        assert!(matches!(
            AuthError::from(DbError::Eindeutigkeit("UNIQUE constraint failed: users.email".into())),
            AuthError::Konflikt(_)
        ));
        assert!(matches!(
            AuthError::from(DbError::nicht_gefunden("x")),
            AuthError::NichtGefunden(_)
        ));
        assert!(matches!(
            AuthError::from(DbError::Zeitlimit("3000 ms".into())),
            AuthError::NichtVerfuegbar(_)
        ));
        assert!(matches!(
            AuthError::from(DbError::intern("kaputt")),
            AuthError::NichtVerfuegbar(_)
        ));
    }

    #[test]
    fn keine_store_details_in_meldung() {
        let e = AuthError::from(DbError::Eindeutigkeit("UNIQUE constraint failed: users.email".into()));
        assert!(!e.to_string().contains("UNIQUE"));
        assert!(!e.to_string().contains("users."));
    }

    #[test]
    fn statuscodes() {
        assert_eq!(AuthError::email_vergeben().http_status(), 409);
        assert_eq!(AuthError::anmeldedaten_falsch().http_status(), 401);
        assert_eq!(AuthError::token_ungueltig().http_status(), 401);
        assert_eq!(AuthError::Verboten("x".into()).http_status(), 403);
        assert_eq!(AuthError::NichtGefunden("x".into()).http_status(), 404);
        assert_eq!(AuthError::NichtVerfuegbar("x".into()).http_status(), 503);
        assert_eq!(AuthError::intern("x").http_status(), 500);
    }
}
