//! transkript-db – Credential-Store
//!
//! Dieses Crate stellt das Repository-Pattern bereit. Die Geschaeftslogik
//! spricht nur mit den Traits aus [`repository`]; [`SqliteDb`] ist die
//! mitgelieferte Implementierung.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use models::{BenachrichtigungRecord, BenutzerRecord, BenutzerUpdate, NeuerBenutzer};
pub use repository::{
    DatabaseConfig, DbResult, NotificationRepository, TransaktionsGrenzen, UserRepository,
};
pub use sqlite::SqliteDb;
