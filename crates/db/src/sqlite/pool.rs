//! SQLite Connection Pool mit WAL-Modus und begrenzten Transaktionen

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::info;

use crate::error::{sqlx_abbilden, DbError};
use crate::repository::{DatabaseConfig, DbResult, TransaktionsGrenzen};

/// Wrapper um den SQLite Connection Pool
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
    pub(crate) grenzen: TransaktionsGrenzen,
}

impl SqliteDb {
    /// Erstellt einen neuen Pool, fuehrt Migrationen aus
    pub async fn oeffnen(config: &DatabaseConfig) -> Result<Self, DbError> {
        let opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(if config.sqlite_wal {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            })
            .busy_timeout(config.grenzen.max_wartezeit)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_verbindungen)
            .acquire_timeout(config.grenzen.max_wartezeit)
            .connect_with(opts)
            .await?;

        info!(url = %config.url, wal = config.sqlite_wal, "SQLite-Pool geoeffnet");

        let db = Self {
            pool,
            grenzen: config.grenzen,
        };
        db.migrationen_ausfuehren().await?;

        Ok(db)
    }

    /// Fuehrt alle ausstehenden Migrationen aus
    pub async fn migrationen_ausfuehren(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Datenbank-Migrationen abgeschlossen");
        Ok(())
    }

    /// Gibt den internen Pool zurueck (fuer Tests)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Erstellt eine In-Memory-Datenbank fuer Tests
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::in_memory_mit_grenzen(TransaktionsGrenzen::default()).await
    }

    /// In-Memory-Datenbank mit eigenen Zeitgrenzen
    pub async fn in_memory_mit_grenzen(grenzen: TransaktionsGrenzen) -> Result<Self, DbError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .busy_timeout(grenzen.max_wartezeit)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            // In-Memory benoetigt genau 1 persistente Verbindung
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(grenzen.max_wartezeit)
            .connect_with(opts)
            .await?;

        let db = Self { pool, grenzen };
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    /// Fuehrt eine schreibende Arbeit auf einem eigenen Task mit Gesamt-Zeitlimit aus
    ///
    /// Bricht der Aufrufer ab, laeuft der Task weiter und die Transaktion wird
    /// vollstaendig committet oder zurueckgerollt. Nach `max_dauer` wird die
    /// Arbeit verworfen (Rollback) und `DbError::Zeitlimit` geliefert.
    pub(crate) async fn begrenzt<T, F>(&self, vorgang: &'static str, arbeit: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let max_dauer = self.grenzen.max_dauer;
        let aufgabe = tokio::spawn(async move {
            match tokio::time::timeout(max_dauer, arbeit).await {
                Ok(ergebnis) => ergebnis,
                Err(_) => Err(DbError::Zeitlimit(format!(
                    "{vorgang}: nach {} ms abgebrochen",
                    max_dauer.as_millis()
                ))),
            }
        });

        aufgabe
            .await
            .map_err(|e| DbError::intern(format!("{vorgang}: Task fehlgeschlagen: {e}")))?
    }
}

/// Beginnt eine Transaktion mit begrenzter Wartezeit
pub(crate) async fn transaktion_beginnen(
    pool: &SqlitePool,
    max_wartezeit: Duration,
) -> DbResult<Transaction<'static, Sqlite>> {
    match tokio::time::timeout(max_wartezeit, pool.begin()).await {
        Ok(tx) => tx.map_err(sqlx_abbilden),
        Err(_) => Err(DbError::Zeitlimit(format!(
            "keine Verbindung nach {} ms",
            max_wartezeit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_migrationen() {
        let db = SqliteDb::in_memory().await.expect("DB");
        let anzahl: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(anzahl, 0);
    }

    #[tokio::test]
    async fn begrenzt_liefert_zeitlimit() {
        let db = SqliteDb::in_memory_mit_grenzen(TransaktionsGrenzen {
            max_wartezeit: Duration::from_millis(50),
            max_dauer: Duration::from_millis(50),
        })
        .await
        .unwrap();

        let ergebnis: DbResult<()> = db
            .begrenzt("Test", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(ergebnis, Err(DbError::Zeitlimit(_))));
    }

    #[tokio::test]
    async fn transaktion_wartet_begrenzt() {
        let grenzen = TransaktionsGrenzen {
            max_wartezeit: Duration::from_millis(50),
            max_dauer: Duration::from_secs(1),
        };
        let db = SqliteDb::in_memory_mit_grenzen(grenzen).await.unwrap();

        // Die einzige Verbindung ist belegt
        let _belegt = db.pool().acquire().await.unwrap();
        let ergebnis = transaktion_beginnen(db.pool(), grenzen.max_wartezeit).await;
        assert!(ergebnis.map(|_| ()).unwrap_err().ist_zeitlimit());
    }
}
