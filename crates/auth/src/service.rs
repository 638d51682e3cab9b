//! Auth-Service fuer Transkript
//!
//! Zentraler Service fuer Registrierung, Login, Token-Pruefung und die
//! Verwaltung von Benutzerkonten. Nutzt ein `UserRepository` (in Produktion
//! den Cache-Aside-Layer vor SQLite), den `TokenDienst`, einen
//! `PasswortHasher` und den `Benachrichtiger`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use transkript_core::{BenutzerEreignis, EreignisArt, Rolle, UserId};
use transkript_db::{BenutzerRecord, BenutzerUpdate, DbResult, NeuerBenutzer, UserRepository};

use crate::{
    error::{AuthError, AuthResult},
    models::{
        Anfragender, AuthAntwort, BenutzerProfil, BootstrapKonto, ProfilUpdate, Registrierung,
    },
    notifier::Benachrichtiger,
    password::PasswortHasher,
    policy::{erfordern, Aktion},
    token::{TokenDienst, TokenError},
};

// Wird fuer unbekannte E-Mails geprueft, damit der Login gleich lange dauert
const ATTRAPPEN_PASSWORT: &str = "transkript-attrappe";

/// Auth-Service – zentraler Einstiegspunkt fuer alle Identitaetsvorgaenge
pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    token_dienst: Arc<TokenDienst>,
    hasher: Arc<dyn PasswortHasher>,
    benachrichtiger: Benachrichtiger,
    bootstrap_konten: Vec<BootstrapKonto>,
    attrappen_hash: OnceCell<String>,
}

impl<U: UserRepository> AuthService<U> {
    /// Erstellt einen neuen AuthService mit den Standard-Bootstrap-Konten
    pub fn neu(
        user_repo: Arc<U>,
        token_dienst: Arc<TokenDienst>,
        hasher: Arc<dyn PasswortHasher>,
        benachrichtiger: Benachrichtiger,
    ) -> Self {
        Self {
            user_repo,
            token_dienst,
            hasher,
            benachrichtiger,
            bootstrap_konten: vec![BootstrapKonto::standard_admin(), BootstrapKonto::standard_test()],
            attrappen_hash: OnceCell::new(),
        }
    }

    /// Ersetzt die Konten, die `standardbenutzer_anlegen` sicherstellt
    pub fn mit_bootstrap_konten(mut self, konten: Vec<BootstrapKonto>) -> Self {
        self.bootstrap_konten = konten;
        self
    }

    pub fn user_repo(&self) -> &Arc<U> {
        &self.user_repo
    }

    /// Registriert einen neuen Benutzer (Rolle USER) und stellt ein Token aus
    pub async fn registrieren(&self, daten: Registrierung) -> AuthResult<AuthAntwort> {
        // Vorpruefung spart das Hashing; die Unique-Constraint entscheidet endgueltig
        if wiederholt("get_by_email", || self.user_repo.get_by_email(&daten.email))
            .await?
            .is_some()
        {
            return Err(AuthError::email_vergeben());
        }

        let password_hash = self.hash_berechnen(&daten.passwort).await?;
        let neu = NeuerBenutzer {
            email: daten.email,
            name: daten.name,
            password_hash,
            role: Rolle::User,
        };
        let benutzer = wiederholt("create", || self.user_repo.create(neu.clone())).await?;

        let token = self.token_ausstellen(&benutzer)?;

        info!(
            user_id = %benutzer.user_id,
            email = %benutzer.email,
            "Neuer Benutzer registriert"
        );
        self.melden(EreignisArt::Erstellt, &benutzer);

        Ok(AuthAntwort {
            benutzer: BenutzerProfil::from(&benutzer),
            token,
        })
    }

    /// Meldet einen Benutzer an und stellt ein Token aus
    ///
    /// Unbekannte E-Mail und falsches Passwort sind fuer den Aufrufer nicht
    /// unterscheidbar.
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<AuthAntwort> {
        let benutzer = match wiederholt("get_by_email", || self.user_repo.get_by_email(email)).await? {
            Some(benutzer) => benutzer,
            None => {
                self.attrappe_pruefen(passwort).await?;
                warn!("Fehlgeschlagener Login-Versuch");
                return Err(AuthError::anmeldedaten_falsch());
            }
        };

        let korrekt = self
            .passwort_pruefen(passwort, &benutzer.password_hash)
            .await?;
        if !korrekt {
            warn!(user_id = %benutzer.user_id, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::anmeldedaten_falsch());
        }

        // Zwischen Lesen und Schreiben geloescht: wie unbekannte E-Mail behandeln
        let benutzer = match wiederholt("update_last_login", || {
            self.user_repo.update_last_login(benutzer.user_id)
        })
        .await
        {
            Ok(b) => b,
            Err(AuthError::NichtGefunden(_)) => return Err(AuthError::anmeldedaten_falsch()),
            Err(e) => return Err(e),
        };

        let token = self.token_ausstellen(&benutzer)?;

        info!(user_id = %benutzer.user_id, "Benutzer angemeldet");

        Ok(AuthAntwort {
            benutzer: BenutzerProfil::from(&benutzer),
            token,
        })
    }

    /// Prueft ein Bearer-Token und liefert die Identitaet des Anfragenden
    pub fn token_pruefen(&self, token: &str) -> AuthResult<Anfragender> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        match self.token_dienst.pruefen(token) {
            Ok(claims) => Ok(Anfragender {
                user_id: claims.sub,
                rolle: claims.role,
            }),
            Err(e) => {
                // Grund nur im Log, der Aufrufer sieht einheitlich 401
                debug!(grund = %e, "Token abgelehnt");
                Err(AuthError::token_ungueltig())
            }
        }
    }

    /// Listet alle Benutzer auf (nur ADMIN)
    pub async fn auflisten(&self, anfragender: &Anfragender) -> AuthResult<Vec<BenutzerProfil>> {
        erfordern(anfragender, None, Aktion::Auflisten)?;

        let alle = wiederholt("list", || self.user_repo.list()).await?;
        Ok(alle.iter().map(BenutzerProfil::from).collect())
    }

    /// Laedt einen Benutzer (ADMIN oder der Benutzer selbst)
    pub async fn laden(&self, anfragender: &Anfragender, ziel: UserId) -> AuthResult<BenutzerProfil> {
        erfordern(anfragender, Some(ziel), Aktion::Laden)?;

        wiederholt("get_by_external_id", || self.user_repo.get_by_external_id(ziel))
            .await?
            .map(|b| BenutzerProfil::from(&b))
            .ok_or_else(|| AuthError::NichtGefunden("Benutzer nicht gefunden".into()))
    }

    /// Aendert einen Benutzer (ADMIN oder der Benutzer selbst)
    ///
    /// Ein Rollenwechsel erfordert zusaetzlich die Rolle ADMIN. Ein neues
    /// Passwort wird vor dem Speichern gehasht.
    pub async fn aktualisieren(
        &self,
        anfragender: &Anfragender,
        ziel: UserId,
        aenderung: ProfilUpdate,
    ) -> AuthResult<BenutzerProfil> {
        erfordern(anfragender, Some(ziel), Aktion::Aktualisieren)?;
        if aenderung.role.is_some() {
            erfordern(anfragender, Some(ziel), Aktion::RolleAendern)?;
        }

        let password_hash = match aenderung.passwort {
            Some(ref passwort) => Some(self.hash_berechnen(passwort).await?),
            None => None,
        };
        let update = BenutzerUpdate {
            email: aenderung.email,
            name: aenderung.name,
            password_hash,
            role: aenderung.role,
        };

        let unveraendert = update.ist_leer();
        let benutzer = wiederholt("update", || self.user_repo.update(ziel, update.clone())).await?;
        if unveraendert {
            debug!(user_id = %benutzer.user_id, "Leere Aktualisierung, nichts geaendert");
            return Ok(BenutzerProfil::from(&benutzer));
        }

        info!(
            user_id = %benutzer.user_id,
            geaendert_von = %anfragender.user_id,
            "Benutzer aktualisiert"
        );
        self.melden(EreignisArt::Aktualisiert, &benutzer);

        Ok(BenutzerProfil::from(&benutzer))
    }

    /// Loescht einen Benutzer (ADMIN oder der Benutzer selbst)
    pub async fn loeschen(&self, anfragender: &Anfragender, ziel: UserId) -> AuthResult<BenutzerProfil> {
        erfordern(anfragender, Some(ziel), Aktion::Loeschen)?;

        let benutzer = wiederholt("delete", || self.user_repo.delete(ziel)).await?;

        info!(
            user_id = %benutzer.user_id,
            geloescht_von = %anfragender.user_id,
            "Benutzer geloescht"
        );
        self.melden(EreignisArt::Geloescht, &benutzer);

        Ok(BenutzerProfil::from(&benutzer))
    }

    /// Stellt sicher, dass die Bootstrap-Konten existieren
    ///
    /// Idempotent: vorhandene Konten werden nicht veraendert. Ein paralleler
    /// Aufruf, der zuerst anlegt, zaehlt als "bereits vorhanden".
    pub async fn standardbenutzer_anlegen(&self) -> AuthResult<Vec<BenutzerProfil>> {
        let mut profile = Vec::with_capacity(self.bootstrap_konten.len());

        for konto in &self.bootstrap_konten {
            if let Some(vorhanden) =
                wiederholt("get_by_email", || self.user_repo.get_by_email(&konto.email)).await?
            {
                debug!(email = %konto.email, "Standardbenutzer bereits vorhanden");
                profile.push(BenutzerProfil::from(&vorhanden));
                continue;
            }

            let password_hash = self.hash_berechnen(&konto.passwort).await?;
            let neu = NeuerBenutzer {
                email: konto.email.clone(),
                name: konto.name.clone(),
                password_hash,
                role: konto.role,
            };

            let benutzer = match wiederholt("create", || self.user_repo.create(neu.clone())).await {
                Ok(b) => {
                    info!(user_id = %b.user_id, email = %b.email, role = %b.role, "Standardbenutzer angelegt");
                    self.melden(EreignisArt::Erstellt, &b);
                    b
                }
                Err(AuthError::Konflikt(_)) => {
                    wiederholt("get_by_email", || self.user_repo.get_by_email(&konto.email))
                        .await?
                        .ok_or_else(|| {
                            AuthError::intern("Standardbenutzer nach Konflikt nicht auffindbar")
                        })?
                }
                Err(e) => return Err(e),
            };
            profile.push(BenutzerProfil::from(&benutzer));
        }

        Ok(profile)
    }

    // --- Interne Hilfsmethoden ---

    fn token_ausstellen(&self, benutzer: &BenutzerRecord) -> AuthResult<String> {
        self.token_dienst
            .ausstellen(benutzer)
            .map(|t| t.token)
            .map_err(|e: TokenError| AuthError::intern(e.to_string()))
    }

    fn melden(&self, art: EreignisArt, benutzer: &BenutzerRecord) {
        self.benachrichtiger
            .melden(BenutzerEreignis::neu(art, benutzer.user_id, &benutzer.email));
    }

    async fn hash_berechnen(&self, passwort: &str) -> AuthResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let passwort = passwort.to_string();
        tokio::task::spawn_blocking(move || hasher.hashen(&passwort))
            .await
            .map_err(|e| AuthError::intern(format!("Hash-Task abgebrochen: {e}")))?
    }

    async fn passwort_pruefen(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let passwort = passwort.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verifizieren(&passwort, &hash))
            .await
            .map_err(|e| AuthError::intern(format!("Pruef-Task abgebrochen: {e}")))?
    }

    async fn attrappe_pruefen(&self, passwort: &str) -> AuthResult<()> {
        let hash = self
            .attrappen_hash
            .get_or_try_init(|| self.hash_berechnen(ATTRAPPEN_PASSWORT))
            .await?;
        self.passwort_pruefen(passwort, hash).await?;
        Ok(())
    }
}

/// Fuehrt eine Store-Operation aus und wiederholt sie einmal bei Zeitlimit
async fn wiederholt<T, F, Fut>(vorgang: &'static str, mut operation: F) -> AuthResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    match operation().await {
        Err(e) if e.ist_zeitlimit() => {
            warn!(vorgang, fehler = %e, "Store-Zeitlimit, wiederhole einmal");
            Ok(operation().await?)
        }
        ergebnis => Ok(ergebnis?),
    }
}
