//! Fehlertypen fuer das Datenbank-Crate

use thiserror::Error;

/// Datenbank-Fehlertypen
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Eindeutigkeitsverletzung: {0}")]
    Eindeutigkeit(String),

    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(String),

    #[error("SQLx-Fehler: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration-Fehler: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Interner DB-Fehler: {0}")]
    Intern(String),
}

impl DbError {
    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn es sich um einen Eindeutigkeitsfehler handelt
    pub fn ist_eindeutigkeit(&self) -> bool {
        match self {
            Self::Eindeutigkeit(_) => true,
            Self::Sqlx(e) => ist_unique_verletzung(e),
            _ => false,
        }
    }

    /// Gibt true zurueck wenn der Store nicht rechtzeitig geantwortet hat
    pub fn ist_zeitlimit(&self) -> bool {
        match self {
            Self::Zeitlimit(_) => true,
            Self::Sqlx(e) => ist_sqlx_zeitlimit(e),
            _ => false,
        }
    }
}

/// Bildet einen SQLx-Fehler auf die fachlichen Varianten ab
///
/// Unique-Verletzungen werden zu `Eindeutigkeit`, Pool-Timeouts und
/// `SQLITE_BUSY` zu `Zeitlimit`. Alles andere bleibt ein `Sqlx`-Fehler.
pub(crate) fn sqlx_abbilden(e: sqlx::Error) -> DbError {
    if ist_unique_verletzung(&e) {
        DbError::Eindeutigkeit(
            e.as_database_error()
                .map(|d| d.message().to_string())
                .unwrap_or_default(),
        )
    } else if ist_sqlx_zeitlimit(&e) {
        DbError::Zeitlimit(e.to_string())
    } else {
        DbError::Sqlx(e)
    }
}

fn ist_unique_verletzung(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

fn ist_sqlx_zeitlimit(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::PoolTimedOut => true,
        // SQLITE_BUSY (5) bzw. SQLITE_BUSY_SNAPSHOT (517)
        sqlx::Error::Database(d) => matches!(d.code().as_deref(), Some("5") | Some("517")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eindeutigkeit_erkennung() {
        assert!(DbError::Eindeutigkeit("email".into()).ist_eindeutigkeit());
        assert!(!DbError::nicht_gefunden("x").ist_eindeutigkeit());
    }

    #[test]
    fn zeitlimit_erkennung() {
        assert!(DbError::Zeitlimit("3000 ms".into()).ist_zeitlimit());
        assert!(DbError::Sqlx(sqlx::Error::PoolTimedOut).ist_zeitlimit());
        assert!(!DbError::intern("x").ist_zeitlimit());
    }

    #[test]
    fn pool_timeout_wird_zeitlimit() {
        let e = sqlx_abbilden(sqlx::Error::PoolTimedOut);
        assert!(matches!(e, DbError::Zeitlimit(_)));
    }
}
