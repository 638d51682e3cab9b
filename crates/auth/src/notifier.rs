//! Lebenszyklus-Benachrichtigungen
//!
//! Der Service uebergibt Ereignisse an einen begrenzten Kanal und wartet nie
//! auf die Zustellung. Ein Worker-Task leert den Kanal und schreibt pro
//! Ereignis eine Nachricht in die `BenachrichtigungsSenke`. Fehler der Senke
//! werden protokolliert und erreichen den Aufrufer nie.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use transkript_core::BenutzerEreignis;
use transkript_db::{NotificationRepository, SqliteDb};

/// Ziel fuer Benachrichtigungen
#[async_trait]
pub trait BenachrichtigungsSenke: Send + Sync + 'static {
    async fn anhaengen(&self, nachricht: &str, zeitpunkt: DateTime<Utc>) -> anyhow::Result<()>;
}

#[async_trait]
impl BenachrichtigungsSenke for SqliteDb {
    async fn anhaengen(&self, nachricht: &str, zeitpunkt: DateTime<Utc>) -> anyhow::Result<()> {
        NotificationRepository::append(self, nachricht, zeitpunkt).await?;
        Ok(())
    }
}

/// Sendeseite des Benachrichtigungs-Kanals
#[derive(Debug, Clone)]
pub struct Benachrichtiger {
    sender: mpsc::Sender<BenutzerEreignis>,
}

impl Benachrichtiger {
    /// Startet den Worker-Task
    ///
    /// Der Task endet, sobald alle `Benachrichtiger`-Klone verworfen sind und
    /// der Kanal leer ist.
    pub fn starten(
        senke: Arc<dyn BenachrichtigungsSenke>,
        kapazitaet: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, empfaenger) = mpsc::channel(kapazitaet.max(1));
        let handle = tokio::spawn(verarbeiten(empfaenger, senke));
        (Self { sender }, handle)
    }

    /// Uebergibt ein Ereignis ohne zu blockieren
    ///
    /// Bei vollem oder geschlossenem Kanal wird das Ereignis verworfen.
    pub fn melden(&self, ereignis: BenutzerEreignis) {
        match self.sender.try_send(ereignis) {
            Ok(()) => {}
            Err(TrySendError::Full(e)) => {
                warn!(art = e.art.als_str(), user_id = %e.user_id, "Benachrichtigungs-Kanal voll, Ereignis verworfen");
            }
            Err(TrySendError::Closed(e)) => {
                warn!(art = e.art.als_str(), user_id = %e.user_id, "Benachrichtigungs-Kanal geschlossen, Ereignis verworfen");
            }
        }
    }
}

async fn verarbeiten(
    mut empfaenger: mpsc::Receiver<BenutzerEreignis>,
    senke: Arc<dyn BenachrichtigungsSenke>,
) {
    while let Some(ereignis) = empfaenger.recv().await {
        let nachricht = ereignis.nachricht();
        match senke.anhaengen(&nachricht, ereignis.zeitpunkt).await {
            Ok(()) => debug!(
                art = ereignis.art.als_str(),
                user_id = %ereignis.user_id,
                "Benachrichtigung gespeichert"
            ),
            Err(e) => error!(
                art = ereignis.art.als_str(),
                user_id = %ereignis.user_id,
                fehler = %e,
                "Benachrichtigung konnte nicht gespeichert werden"
            ),
        }
    }
    debug!("Benachrichtigungs-Worker beendet");
}
