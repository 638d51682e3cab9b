//! Integration-Tests fuer NotificationRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use transkript_db::{NotificationRepository, SqliteDb};

#[tokio::test]
async fn benachrichtigung_anhaengen_und_lesen() {
    let db = SqliteDb::in_memory().await.unwrap();
    let jetzt = Utc::now();

    NotificationRepository::append(&db, "erste", jetzt - Duration::seconds(10))
        .await
        .unwrap();
    let zweite = NotificationRepository::append(&db, "zweite", jetzt)
        .await
        .unwrap();
    assert_eq!(zweite.message, "zweite");

    let neueste = NotificationRepository::list_recent(&db, 10).await.unwrap();
    let texte: Vec<_> = neueste.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(texte, ["zweite", "erste"]);
}

#[tokio::test]
async fn limit_wird_beachtet() {
    let db = SqliteDb::in_memory().await.unwrap();
    for i in 0..5 {
        NotificationRepository::append(&db, &format!("n{i}"), Utc::now())
            .await
            .unwrap();
    }

    let neueste = NotificationRepository::list_recent(&db, 2).await.unwrap();
    assert_eq!(neueste.len(), 2);
}
