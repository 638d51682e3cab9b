//! Signierte, zeitlich begrenzte Tokens
//!
//! Tokens sind HS256-signierte JWTs mit externer Benutzer-ID (`sub`), Rolle,
//! Ausstellungs- und Ablaufzeitpunkt. Es gibt keine Sperrliste: ein Token ist
//! bis zum Ablauf gueltig, ein neues Secret entwertet alle Tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use transkript_core::{Rolle, UserId};
use transkript_db::BenutzerRecord;

/// Fehler beim Ausstellen oder Pruefen eines Tokens
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token-Secret darf nicht leer sein")]
    LeeresSecret,

    #[error("Token ungueltig")]
    Ungueltig,

    #[error("Token abgelaufen")]
    Abgelaufen,

    #[error("Ablaufzeitpunkt nicht darstellbar")]
    Gueltigkeit,

    #[error("Token konnte nicht signiert werden: {0}")]
    Signatur(String),
}

pub type TokenResult<T> = Result<T, TokenError>;

/// Inhalt eines Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Externe Benutzer-ID
    pub sub: UserId,
    pub role: Rolle,
    /// Ausgestellt (Unix-Sekunden)
    pub iat: i64,
    /// Ablauf (Unix-Sekunden)
    pub exp: i64,
}

/// Ein frisch ausgestelltes Token samt Claims
#[derive(Debug, Clone)]
pub struct AusgestelltesToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Stellt Tokens aus und prueft sie
pub struct TokenDienst {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    gueltigkeit: Duration,
}

impl TokenDienst {
    pub fn neu(secret: &str, gueltigkeit: Duration) -> TokenResult<Self> {
        if secret.is_empty() {
            return Err(TokenError::LeeresSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub", "iat"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            gueltigkeit,
        })
    }

    pub fn gueltigkeit(&self) -> Duration {
        self.gueltigkeit
    }

    /// Stellt ein Token fuer den Benutzer aus
    pub fn ausstellen(&self, benutzer: &BenutzerRecord) -> TokenResult<AusgestelltesToken> {
        self.ausstellen_zum(benutzer.user_id, benutzer.role, Utc::now())
    }

    pub(crate) fn ausstellen_zum(
        &self,
        user_id: UserId,
        role: Rolle,
        jetzt: DateTime<Utc>,
    ) -> TokenResult<AusgestelltesToken> {
        let ablauf = jetzt
            .checked_add_signed(self.gueltigkeit)
            .ok_or(TokenError::Gueltigkeit)?;
        let claims = TokenClaims {
            sub: user_id,
            role,
            iat: jetzt.timestamp(),
            exp: ablauf.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signatur(e.to_string()))?;

        Ok(AusgestelltesToken { token, claims })
    }

    /// Prueft Signatur und Ablauf
    ///
    /// Der Ablauf wird nur fuer korrekt signierte Tokens ausgewertet; ein
    /// abgelaufenes Token mit falscher Signatur ist `Ungueltig`.
    pub fn pruefen(&self, token: &str) -> TokenResult<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|daten| daten.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Abgelaufen,
                _ => TokenError::Ungueltig,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dienst(secret: &str) -> TokenDienst {
        TokenDienst::neu(secret, Duration::hours(24)).unwrap()
    }

    #[test]
    fn ablauf_ausserhalb_des_kalenders() {
        let dienst = TokenDienst::neu("geheim", Duration::MAX).unwrap();
        let err = dienst
            .ausstellen_zum(UserId::new(), Rolle::User, Utc::now())
            .unwrap_err();
        assert_eq!(err, TokenError::Gueltigkeit);
    }

    #[test]
    fn ausstellen_und_pruefen() {
        let dienst = dienst("geheim");
        let id = UserId::new();
        let ausgestellt = dienst.ausstellen_zum(id, Rolle::Admin, Utc::now()).unwrap();

        let claims = dienst.pruefen(&ausgestellt.token).unwrap();
        assert_eq!(claims, ausgestellt.claims);
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Rolle::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn abgelaufenes_token() {
        let dienst = dienst("geheim");
        let vorgestern = Utc::now() - Duration::hours(25);
        let ausgestellt = dienst
            .ausstellen_zum(UserId::new(), Rolle::User, vorgestern)
            .unwrap();

        assert_eq!(dienst.pruefen(&ausgestellt.token), Err(TokenError::Abgelaufen));
    }

    #[test]
    fn fremdes_secret_ist_ungueltig() {
        let ausgestellt = dienst("alt")
            .ausstellen_zum(UserId::new(), Rolle::User, Utc::now())
            .unwrap();
        assert_eq!(dienst("neu").pruefen(&ausgestellt.token), Err(TokenError::Ungueltig));
    }

    #[test]
    fn abgelaufen_mit_falscher_signatur_ist_ungueltig() {
        let ausgestellt = dienst("alt")
            .ausstellen_zum(UserId::new(), Rolle::User, Utc::now() - Duration::days(3))
            .unwrap();
        assert_eq!(dienst("neu").pruefen(&ausgestellt.token), Err(TokenError::Ungueltig));
    }

    #[test]
    fn manipulierte_claims_sind_ungueltig() {
        let dienst = dienst("geheim");
        let ausgestellt = dienst
            .ausstellen_zum(UserId::new(), Rolle::User, Utc::now())
            .unwrap();

        // Payload eines anderen Tokens mit der Signatur des ersten
        let admin = dienst
            .ausstellen_zum(UserId::new(), Rolle::Admin, Utc::now())
            .unwrap();
        let teile: Vec<&str> = ausgestellt.token.split('.').collect();
        let admin_teile: Vec<&str> = admin.token.split('.').collect();
        let gefaelscht = format!("{}.{}.{}", teile[0], admin_teile[1], teile[2]);

        assert_eq!(dienst.pruefen(&gefaelscht), Err(TokenError::Ungueltig));
    }

    #[test]
    fn unsinn_ist_ungueltig() {
        assert_eq!(dienst("geheim").pruefen("kein.token"), Err(TokenError::Ungueltig));
        assert_eq!(dienst("geheim").pruefen(""), Err(TokenError::Ungueltig));
    }

    #[test]
    fn leeres_secret_wird_abgelehnt() {
        assert!(matches!(
            TokenDienst::neu("", Duration::hours(1)),
            Err(TokenError::LeeresSecret)
        ));
    }
}
