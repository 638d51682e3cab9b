//! transkript-auth – Identitaets- und Zugriffs-Service
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Signierte, zeitlich begrenzte Tokens (HS256)
//! - Berechtigungs-Policy (ADMIN / Eigentuemer)
//! - Asynchrone Lebenszyklus-Benachrichtigungen
//! - AuthService (Registrierung, Login, Auflisten, Laden, Aendern, Loeschen,
//!   Standardbenutzer)
//! - Transport-neutrale Anfrage-Verarbeitung

pub mod anfrage;
pub mod error;
pub mod models;
pub mod notifier;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use anfrage::{IdentitaetsAnfrage, IdentitaetsAntwort};
pub use error::{AuthError, AuthResult};
pub use models::{
    Anfragender, Anmeldung, AuthAntwort, BenutzerProfil, BootstrapKonto, ProfilUpdate,
    Registrierung,
};
pub use notifier::{BenachrichtigungsSenke, Benachrichtiger};
pub use password::{Argon2Hasher, PasswortHasher, PasswortParameter};
pub use policy::{erlaubt, Aktion};
pub use service::AuthService;
pub use token::{AusgestelltesToken, TokenClaims, TokenDienst, TokenError};
