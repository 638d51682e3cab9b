//! transkript-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Cache, Benachrichtigungen und Auth-Service und
//! stellt den oeffentlichen Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use config::ServerConfig;
use transkript_auth::{Argon2Hasher, AuthService, BenachrichtigungsSenke, Benachrichtiger, TokenDienst};
use transkript_cache::{CachingUserRepository, MemoryCache};
use transkript_db::SqliteDb;

/// Benutzer-Repository des Servers: Cache-Aside vor SQLite
pub type BenutzerRepository = CachingUserRepository<SqliteDb, Arc<MemoryCache>>;

/// Laufzeit-Dienste des Servers
pub struct Dienste {
    pub auth: AuthService<BenutzerRepository>,
    pub db: SqliteDb,
    /// Worker des Benachrichtigungs-Kanals; endet, wenn `auth` verworfen wird
    pub benachrichtigungen: JoinHandle<()>,
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Baut alle Dienste auf
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Benachrichtigungs-Worker ueber der SQLite-Senke starten
    /// 3. Cache-Aside-Repository aufbauen
    /// 4. AuthService erstellen
    pub async fn dienste_aufbauen(&self) -> Result<Dienste> {
        let config = &self.config;

        tracing::info!(url = %config.datenbank.url, "Datenbankverbindung wird hergestellt");
        let db = SqliteDb::oeffnen(&config.database_config())
            .await
            .context("Datenbank konnte nicht geoeffnet werden")?;

        let senke: Arc<dyn BenachrichtigungsSenke> = Arc::new(db.clone());
        let (benachrichtiger, benachrichtigungen) =
            Benachrichtiger::starten(senke, config.benachrichtigungen.kapazitaet);

        let cache = MemoryCache::neu_mit_cleanup(MemoryCache::neu());
        let repo = CachingUserRepository::neu(db.clone(), cache, config.cache_config());

        let token_dienst = TokenDienst::neu(&config.token.secret, config.token_gueltigkeit())
            .context("Token-Dienst konnte nicht erstellt werden")?;
        let hasher = Argon2Hasher::neu(config.passwort).context("Ungueltige Passwort-Parameter")?;

        let auth = AuthService::neu(
            Arc::new(repo),
            Arc::new(token_dienst),
            Arc::new(hasher),
            benachrichtiger,
        )
        .mit_bootstrap_konten(config.bootstrap_konten());

        Ok(Dienste {
            auth,
            db,
            benachrichtigungen,
        })
    }

    /// Startet alle Dienste und laeuft bis zum Shutdown-Signal
    pub async fn starten(self) -> Result<()> {
        let dienste = self.dienste_aufbauen().await?;

        if self.config.bootstrap.aktiviert {
            let konten = dienste
                .auth
                .standardbenutzer_anlegen()
                .await
                .context("Standardbenutzer konnten nicht angelegt werden")?;
            tracing::info!(anzahl = konten.len(), "Standardbenutzer sichergestellt");
        }

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        // Kanal schliessen und ausstehende Benachrichtigungen noch schreiben
        drop(dienste.auth);
        if tokio::time::timeout(Duration::from_secs(5), dienste.benachrichtigungen)
            .await
            .is_err()
        {
            tracing::warn!("Benachrichtigungen nicht rechtzeitig geschrieben");
        }

        Ok(())
    }
}
