use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Turns a raw bearer token into verified claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 validator over a shared secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry lives in `expires_at` and is checked by `validate_claims`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl std::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "token failed to decode");
                JwtError::Decode(e.to_string())
            })?;
        validate_claims(&data.claims, now).map_err(|e| {
            tracing::debug!(subject = %data.claims.sub, error = %e, "token outside its validity window");
            e
        })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use voltran_core::OwnerId;

    use crate::Role;

    fn mint(secret: &str, issued_at: DateTime<Utc>) -> (String, JwtClaims) {
        let claims = JwtClaims {
            sub: OwnerId::new(),
            username: "store-keeper".to_string(),
            role: Role::USER,
            issued_at,
            expires_at: issued_at + Duration::hours(24),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (token, claims)
    }

    #[test]
    fn valid_token_yields_claims() {
        let now = Utc::now();
        let (token, claims) = mint("s3cret", now);
        let validator = Hs256JwtValidator::new("s3cret");
        assert_eq!(validator.validate(&token, now).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let (token, _) = mint("s3cret", now);
        let validator = Hs256JwtValidator::new("other");
        assert!(matches!(validator.validate(&token, now), Err(JwtError::Decode(_))));
        assert!(matches!(validator.validate("not-a-jwt", now), Err(JwtError::Decode(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::days(2);
        let (token, _) = mint("s3cret", issued);
        let validator = Hs256JwtValidator::new("s3cret");
        assert_eq!(
            validator.validate(&token, Utc::now()),
            Err(JwtError::Claims(TokenValidationError::Expired))
        );
    }
}
