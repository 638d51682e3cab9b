//! Passwort-Hashing mit Argon2id
//!
//! Stellt sichere Passwort-Hashfunktionen mit Argon2id bereit.
//! Argon2id ist der empfohlene Algorithmus gemaess OWASP-Richtlinien.
//! Der gespeicherte PHC-String enthaelt Algorithmus, Parameter und Salt,
//! daher bleiben alte Hashes nach einer Parameteraenderung pruefbar.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Schnittstelle zum Hashen und Pruefen von Passwoertern
///
/// Beide Operationen sind CPU-intensiv; der Service ruft sie ueber
/// `spawn_blocking` auf.
pub trait PasswortHasher: Send + Sync + 'static {
    /// Hasht ein Passwort mit zufaelligem Salt
    fn hashen(&self, passwort: &str) -> AuthResult<String>;

    /// Gibt `true` zurueck wenn das Passwort zum Hash passt
    fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool>;
}

/// Argon2id-Parameter
///
/// Standardwerte gemaess OWASP-Empfehlungen (Stand 2024):
/// - Speicher: 64 MiB
/// - Iterationen: 3
/// - Parallelismus: 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswortParameter {
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
}

impl Default for PasswortParameter {
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelitaet: 1,
        }
    }
}

/// Argon2id-Implementierung von `PasswortHasher`
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn neu(parameter: PasswortParameter) -> AuthResult<Self> {
        let params = Params::new(
            parameter.speicher_kib,
            parameter.iterationen,
            parameter.parallelitaet,
            None, // output_len: Standard (32 Bytes)
        )
        .map_err(|e| AuthError::PasswortHashing(format!("Argon2-Parameter ungueltig: {e}")))?;

        Ok(Self { params })
    }

    fn argon2_instanz(&self) -> Argon2<'static> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswortHasher for Argon2Hasher {
    fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2_instanz()
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

        match self
            .argon2_instanz()
            .verify_password(passwort.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::neu(PasswortParameter {
        speicher_kib: 256,
        iterationen: 1,
        parallelitaet: 1,
    })
    .expect("Test-Parameter gueltig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let hasher = test_hasher();
        let passwort = "sicheres_passwort_123!";
        let hash = hasher.hashen(passwort).expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert!(!hash.contains(passwort));

        let korrekt = hasher
            .verifizieren(passwort, &hash)
            .expect("Verifikation fehlgeschlagen");
        assert!(korrekt, "Passwort muss korrekt verifiziert werden");
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let hasher = test_hasher();
        let hash = hasher.hashen("richtiges_passwort").unwrap();

        let korrekt = hasher.verifizieren("falsches_passwort", &hash).unwrap();
        assert!(!korrekt, "Falsches Passwort muss abgelehnt werden");
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let hasher = test_hasher();
        let hash1 = hasher.hashen("gleich").unwrap();
        let hash2 = hasher.hashen("gleich").unwrap();

        assert_ne!(hash1, hash2, "Salt muss verschiedene Hashes erzeugen");
    }

    #[test]
    fn hash_mit_anderen_parametern_bleibt_pruefbar() {
        let alt = test_hasher();
        let hash = alt.hashen("pw").unwrap();

        let neu = Argon2Hasher::neu(PasswortParameter {
            speicher_kib: 512,
            iterationen: 2,
            parallelitaet: 1,
        })
        .unwrap();
        assert!(neu.verifizieren("pw", &hash).unwrap());
    }

    #[test]
    fn ungueltiges_hash_format_gibt_fehler() {
        let ergebnis = test_hasher().verifizieren("passwort", "kein_gueltiger_hash");
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }

    #[test]
    fn ungueltige_parameter() {
        let ergebnis = Argon2Hasher::neu(PasswortParameter {
            speicher_kib: 1,
            iterationen: 0,
            parallelitaet: 1,
        });
        assert!(ergebnis.is_err());
    }
}
