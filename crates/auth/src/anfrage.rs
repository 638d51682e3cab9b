//! Transport-neutrale Anfrage-Verarbeitung
//!
//! Eine Transport-Schicht (HTTP, TCP, CLI) uebersetzt ihre Anfragen in
//! `IdentitaetsAnfrage`, ruft `AuthService::ausfuehren` auf und gibt die
//! `IdentitaetsAntwort` bzw. `AuthError::http_status` unveraendert weiter.

use serde::{Deserialize, Serialize};

use transkript_core::UserId;
use transkript_db::UserRepository;

use crate::error::{AuthError, AuthResult};
use crate::models::{Anfragender, Anmeldung, AuthAntwort, BenutzerProfil, ProfilUpdate, Registrierung};
use crate::service::AuthService;

/// Eine Anfrage an den Identitaets-Service
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "aktion", rename_all = "snake_case")]
pub enum IdentitaetsAnfrage {
    Registrieren {
        body: Registrierung,
    },
    Anmelden {
        body: Anmeldung,
    },
    Initialisieren,
    Auflisten {
        #[serde(default)]
        token: Option<String>,
    },
    Laden {
        #[serde(default)]
        token: Option<String>,
        id: String,
    },
    Aktualisieren {
        #[serde(default)]
        token: Option<String>,
        id: String,
        #[serde(default)]
        body: ProfilUpdate,
    },
    Loeschen {
        #[serde(default)]
        token: Option<String>,
        id: String,
    },
}

/// Antwort des Identitaets-Service
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IdentitaetsAntwort {
    Authentifiziert(AuthAntwort),
    Benutzer(BenutzerProfil),
    Benutzerliste(Vec<BenutzerProfil>),
}

impl<U: UserRepository> AuthService<U> {
    /// Fuehrt eine Anfrage aus: Token pruefen, Pfad-ID parsen, Operation aufrufen
    pub async fn ausfuehren(&self, anfrage: IdentitaetsAnfrage) -> AuthResult<IdentitaetsAntwort> {
        match anfrage {
            IdentitaetsAnfrage::Registrieren { body } => self
                .registrieren(body)
                .await
                .map(IdentitaetsAntwort::Authentifiziert),
            IdentitaetsAnfrage::Anmelden { body } => self
                .anmelden(&body.email, &body.passwort)
                .await
                .map(IdentitaetsAntwort::Authentifiziert),
            IdentitaetsAnfrage::Initialisieren => self
                .standardbenutzer_anlegen()
                .await
                .map(IdentitaetsAntwort::Benutzerliste),
            IdentitaetsAnfrage::Auflisten { token } => {
                let anfragender = self.anfragender(token.as_deref())?;
                self.auflisten(&anfragender)
                    .await
                    .map(IdentitaetsAntwort::Benutzerliste)
            }
            IdentitaetsAnfrage::Laden { token, id } => {
                let anfragender = self.anfragender(token.as_deref())?;
                let ziel = ziel_parsen(&anfragender, &id)?;
                self.laden(&anfragender, ziel)
                    .await
                    .map(IdentitaetsAntwort::Benutzer)
            }
            IdentitaetsAnfrage::Aktualisieren { token, id, body } => {
                let anfragender = self.anfragender(token.as_deref())?;
                let ziel = ziel_parsen(&anfragender, &id)?;
                self.aktualisieren(&anfragender, ziel, body)
                    .await
                    .map(IdentitaetsAntwort::Benutzer)
            }
            IdentitaetsAnfrage::Loeschen { token, id } => {
                let anfragender = self.anfragender(token.as_deref())?;
                let ziel = ziel_parsen(&anfragender, &id)?;
                self.loeschen(&anfragender, ziel)
                    .await
                    .map(IdentitaetsAntwort::Benutzer)
            }
        }
    }

    fn anfragender(&self, token: Option<&str>) -> AuthResult<Anfragender> {
        match token {
            Some(t) => self.token_pruefen(t),
            None => Err(AuthError::token_ungueltig()),
        }
    }
}

/// Parst eine Pfad-ID
///
/// Eine unlesbare ID kann nie die eigene sein: fuer Nicht-Admins ist das
/// `Verboten`, fuer Admins `NichtGefunden`.
fn ziel_parsen(anfragender: &Anfragender, id: &str) -> AuthResult<UserId> {
    id.parse::<UserId>().map_err(|_| {
        if anfragender.rolle.ist_admin() {
            AuthError::NichtGefunden("Benutzer nicht gefunden".into())
        } else {
            AuthError::Verboten("Zugriff auf fremde Benutzer nicht erlaubt".into())
        }
    })
}
