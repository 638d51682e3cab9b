//! Cache-Schluessel, deterministisch aus der Abfrageform abgeleitet

use transkript_core::UserId;

/// Schluessel fuer die Liste aller Benutzer
pub const ALLE_BENUTZER: &str = "users:all";

/// Schluessel fuer einen Benutzer nach E-Mail
pub fn benutzer_email(email: &str) -> String {
    format!("user:{email}")
}

/// Schluessel fuer einen Benutzer nach externer ID
///
/// Kollidiert nicht mit `benutzer_email`, da eine E-Mail immer ein `@` enthaelt.
pub fn benutzer_id(user_id: UserId) -> String {
    format!("user:id:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schluessel_format() {
        assert_eq!(benutzer_email("a@x.com"), "user:a@x.com");
        let id = UserId::new();
        assert_eq!(benutzer_id(id), format!("user:id:{}", id.inner()));
        assert_eq!(ALLE_BENUTZER, "users:all");
    }
}
