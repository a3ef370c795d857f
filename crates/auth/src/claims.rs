use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use voltran_core::OwnerId;

use crate::Role;

/// Claims the ledger expects in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Owner identifier; every record the caller touches is scoped by it.
    pub sub: OwnerId,

    pub username: String,

    #[serde(default)]
    pub role: Role,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature checks happen in [`crate::jwt`]; this only looks at the claims.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims {
            sub: OwnerId::new(),
            username: "site-admin".to_string(),
            role: Role::USER,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn window_is_checked() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
        let c = claims(t0, Duration::hours(24));

        assert_eq!(validate_claims(&c, t0), Ok(()));
        assert_eq!(
            validate_claims(&c, t0 - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&c, t0 + Duration::hours(24)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims(t0, Duration::zero()), t0),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn role_defaults_to_user_when_absent() {
        let c = claims(Utc::now(), Duration::hours(1));
        let mut json = serde_json::to_value(&c).unwrap();
        json.as_object_mut().unwrap().remove("role");

        let back: JwtClaims = serde_json::from_value(json).unwrap();
        assert_eq!(back.role, Role::USER);
        assert_eq!(back.sub, c.sub);
    }
}
