//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Einzige Ausnahme ist das Token-Secret: ohne Secret
//! startet der Server nicht.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use transkript_auth::{BootstrapKonto, PasswortParameter};
use transkript_cache::CacheConfig;
use transkript_core::Rolle;
use transkript_db::{DatabaseConfig, TransaktionsGrenzen};

/// Obergrenze fuer Cache-Lebensdauern: 1 Tag
const MAX_CACHE_TTL_SEKUNDEN: u64 = 24 * 60 * 60;

/// Obergrenze fuer die Token-Gueltigkeit: 1 Jahr
const MAX_GUELTIGKEIT_STUNDEN: i64 = 365 * 24;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Cache-Lebensdauern
    pub cache: CacheEinstellungen,
    /// Token-Secret und Gueltigkeit
    pub token: TokenEinstellungen,
    /// Argon2-Parameter
    pub passwort: PasswortParameter,
    /// Standardkonten beim Start
    pub bootstrap: BootstrapEinstellungen,
    /// Benachrichtigungs-Kanal
    pub benachrichtigungen: BenachrichtigungsEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
    /// Maximale Wartezeit auf Verbindung oder Sperre
    pub max_wartezeit_ms: u64,
    /// Maximale Dauer einer schreibenden Transaktion
    pub max_dauer_ms: u64,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://transkript.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
            max_wartezeit_ms: 1000,
            max_dauer_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEinstellungen {
    pub liste_ttl_sekunden: u64,
    pub eintrag_ttl_sekunden: u64,
}

impl Default for CacheEinstellungen {
    fn default() -> Self {
        Self {
            liste_ttl_sekunden: 60,
            eintrag_ttl_sekunden: 300,
        }
    }
}

/// Token-Einstellungen
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenEinstellungen {
    /// HMAC-Secret (wird von `TRANSKRIPT_JWT_SECRET` ueberschrieben)
    pub secret: String,
    pub gueltigkeit_stunden: i64,
}

impl Default for TokenEinstellungen {
    fn default() -> Self {
        Self {
            secret: String::new(),
            gueltigkeit_stunden: 24,
        }
    }
}

// Secret nie in Debug-Ausgaben
impl std::fmt::Debug for TokenEinstellungen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEinstellungen")
            .field("secret", &"<verborgen>")
            .field("gueltigkeit_stunden", &self.gueltigkeit_stunden)
            .finish()
    }
}

/// Standardkonten, die beim Start sichergestellt werden
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapEinstellungen {
    pub aktiviert: bool,
    pub admin_email: String,
    pub admin_name: String,
    pub admin_passwort: String,
    pub test_email: String,
    pub test_name: String,
    pub test_passwort: String,
}

impl Default for BootstrapEinstellungen {
    fn default() -> Self {
        let admin = BootstrapKonto::standard_admin();
        let test = BootstrapKonto::standard_test();
        Self {
            aktiviert: true,
            admin_email: admin.email,
            admin_name: admin.name,
            admin_passwort: admin.passwort,
            test_email: test.email,
            test_name: test.name,
            test_passwort: test.passwort,
        }
    }
}

impl std::fmt::Debug for BootstrapEinstellungen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapEinstellungen")
            .field("aktiviert", &self.aktiviert)
            .field("admin_email", &self.admin_email)
            .field("test_email", &self.test_email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenachrichtigungsEinstellungen {
    /// Kapazitaet des Kanals; bei vollem Kanal werden Ereignisse verworfen
    pub kapazitaet: usize,
}

impl Default for BenachrichtigungsEinstellungen {
    fn default() -> Self {
        Self { kapazitaet: 1024 }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Ersetzt das Secret, falls ein nicht-leerer Wert gegeben ist
    pub fn secret_ueberschreiben(&mut self, secret: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.token.secret = secret;
        }
    }

    /// Prueft Werte, fuer die es keinen sinnvollen Standard gibt
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.token.secret.is_empty() {
            anyhow::bail!(
                "Kein Token-Secret konfiguriert: [token] secret oder TRANSKRIPT_JWT_SECRET setzen"
            );
        }
        if !(1..=MAX_GUELTIGKEIT_STUNDEN).contains(&self.token.gueltigkeit_stunden) {
            anyhow::bail!(
                "[token] gueltigkeit_stunden muss zwischen 1 und {MAX_GUELTIGKEIT_STUNDEN} liegen"
            );
        }
        for (feld, wert) in [
            ("liste_ttl_sekunden", self.cache.liste_ttl_sekunden),
            ("eintrag_ttl_sekunden", self.cache.eintrag_ttl_sekunden),
        ] {
            if wert > MAX_CACHE_TTL_SEKUNDEN {
                anyhow::bail!("[cache] {feld} darf hoechstens {MAX_CACHE_TTL_SEKUNDEN} sein");
            }
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
            grenzen: TransaktionsGrenzen {
                max_wartezeit: Duration::from_millis(self.datenbank.max_wartezeit_ms),
                max_dauer: Duration::from_millis(self.datenbank.max_dauer_ms),
            },
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            liste_ttl: Duration::from_secs(self.cache.liste_ttl_sekunden),
            eintrag_ttl: Duration::from_secs(self.cache.eintrag_ttl_sekunden),
        }
    }

    pub fn token_gueltigkeit(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token.gueltigkeit_stunden)
    }

    pub fn bootstrap_konten(&self) -> Vec<BootstrapKonto> {
        let b = &self.bootstrap;
        vec![
            BootstrapKonto {
                email: b.admin_email.clone(),
                name: b.admin_name.clone(),
                passwort: b.admin_passwort.clone(),
                role: Rolle::Admin,
            },
            BootstrapKonto {
                email: b.test_email.clone(),
                name: b.test_name.clone(),
                passwort: b.test_passwort.clone(),
                role: Rolle::User,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.datenbank.url, "sqlite://transkript.db");
        assert_eq!(cfg.cache.liste_ttl_sekunden, 60);
        assert_eq!(cfg.cache.eintrag_ttl_sekunden, 300);
        assert_eq!(cfg.token.gueltigkeit_stunden, 24);
        assert_eq!(cfg.passwort.speicher_kib, 64 * 1024);
        assert_eq!(cfg.bootstrap.admin_email, "admin@example.com");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn ohne_secret_ungueltig() {
        let mut cfg = ServerConfig::default();
        assert!(cfg.validieren().is_err());

        cfg.secret_ueberschreiben(Some(String::new()));
        assert!(cfg.validieren().is_err());

        cfg.secret_ueberschreiben(Some("aus-umgebung".into()));
        assert!(cfg.validieren().is_ok());
        assert_eq!(cfg.token.secret, "aus-umgebung");
    }

    #[test]
    fn grenzen_fuer_lebensdauern() {
        let mut cfg = ServerConfig::default();
        cfg.secret_ueberschreiben(Some("geheim".into()));

        cfg.token.gueltigkeit_stunden = i64::MAX;
        assert!(cfg.validieren().is_err());
        cfg.token.gueltigkeit_stunden = 0;
        assert!(cfg.validieren().is_err());
        cfg.token.gueltigkeit_stunden = MAX_GUELTIGKEIT_STUNDEN;
        assert!(cfg.validieren().is_ok());

        cfg.cache.eintrag_ttl_sekunden = u64::MAX;
        assert!(cfg.validieren().is_err());
        cfg.cache.eintrag_ttl_sekunden = 300;
        cfg.cache.liste_ttl_sekunden = MAX_CACHE_TTL_SEKUNDEN + 1;
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn umgebung_hat_vorrang() {
        let mut cfg: ServerConfig = toml::from_str("[token]\nsecret = \"aus-datei\"").unwrap();
        cfg.secret_ueberschreiben(None);
        assert_eq!(cfg.token.secret, "aus-datei");
        cfg.secret_ueberschreiben(Some("aus-umgebung".into()));
        assert_eq!(cfg.token.secret, "aus-umgebung");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [datenbank]
            url = "sqlite://test.db"
            max_dauer_ms = 500

            [cache]
            liste_ttl_sekunden = 10

            [passwort]
            iterationen = 4
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.datenbank.url, "sqlite://test.db");
        assert_eq!(cfg.database_config().grenzen.max_dauer, Duration::from_millis(500));
        assert_eq!(cfg.cache_config().liste_ttl, Duration::from_secs(10));
        assert_eq!(cfg.passwort.iterationen, 4);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.database_config().grenzen.max_wartezeit, Duration::from_secs(1));
        assert_eq!(cfg.cache_config().eintrag_ttl, Duration::from_secs(300));
        assert_eq!(cfg.passwort.speicher_kib, 64 * 1024);
    }

    #[test]
    fn debug_verbirgt_secret() {
        let mut cfg = ServerConfig::default();
        cfg.secret_ueberschreiben(Some("streng-geheim".into()));
        assert!(!format!("{cfg:?}").contains("streng-geheim"));
        assert!(!format!("{cfg:?}").contains("adminpassword"));
    }

    #[test]
    fn bootstrap_konten_aus_config() {
        let cfg: ServerConfig =
            toml::from_str("[bootstrap]\nadmin_email = \"root@firma.de\"").unwrap();
        let konten = cfg.bootstrap_konten();
        assert_eq!(konten[0].email, "root@firma.de");
        assert!(konten[0].role.ist_admin());
        assert_eq!(konten[1].email, "user@example.com");
    }
}
