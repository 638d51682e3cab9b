//! Integration-Tests fuer die Server-Verdrahtung (In-Memory SQLite)

use transkript_auth::{PasswortParameter, Registrierung};
use transkript_core::Rolle;
use transkript_db::NotificationRepository;
use transkript_server::{config::ServerConfig, Server};

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.datenbank.url = "sqlite::memory:".into();
    config.datenbank.max_verbindungen = 1;
    config.datenbank.sqlite_wal = false;
    config.passwort = PasswortParameter {
        speicher_kib: 256,
        iterationen: 1,
        parallelitaet: 1,
    };
    config.secret_ueberschreiben(Some("verdrahtung-secret".into()));
    config
}

#[tokio::test]
async fn dienste_arbeiten_zusammen() {
    let server = Server::neu(test_config());
    let dienste = server.dienste_aufbauen().await.expect("Dienste aufbauen");

    let konten = dienste.auth.standardbenutzer_anlegen().await.unwrap();
    assert_eq!(konten.len(), 2);

    let admin = dienste
        .auth
        .anmelden("admin@example.com", "adminpassword")
        .await
        .unwrap();
    assert_eq!(admin.benutzer.role, Rolle::Admin);

    dienste
        .auth
        .registrieren(Registrierung {
            email: "neu@x.com".into(),
            name: "Neu".into(),
            passwort: "pw".into(),
        })
        .await
        .unwrap();

    let anfragender = dienste.auth.token_pruefen(&admin.token).unwrap();
    assert_eq!(dienste.auth.auflisten(&anfragender).await.unwrap().len(), 3);

    // Kanal schliessen, Worker schreibt ausstehende Ereignisse
    drop(dienste.auth);
    dienste.benachrichtigungen.await.unwrap();

    let nachrichten = NotificationRepository::list_recent(&dienste.db, 10)
        .await
        .unwrap();
    assert_eq!(nachrichten.len(), 3);
    assert!(nachrichten
        .iter()
        .any(|n| n.message == "Neuer Benutzer registriert: neu@x.com"));
}

#[tokio::test]
async fn bootstrap_konten_aus_config() {
    let mut config = test_config();
    config.bootstrap.admin_email = "root@firma.de".into();
    config.bootstrap.admin_passwort = "wurzel".into();

    let dienste = Server::neu(config).dienste_aufbauen().await.unwrap();
    dienste.auth.standardbenutzer_anlegen().await.unwrap();

    let login = dienste.auth.anmelden("root@firma.de", "wurzel").await.unwrap();
    assert!(login.benutzer.role.ist_admin());
    assert!(dienste
        .auth
        .anmelden("admin@example.com", "adminpassword")
        .await
        .is_err());
}
