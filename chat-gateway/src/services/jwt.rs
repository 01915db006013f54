use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ServiceError;
use crate::config::JwtConfig;

/// Issues and verifies stateless session tokens (HS256).
///
/// Nothing is stored server-side: a token is valid exactly when its
/// signature checks out against the process secret and it has not expired.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token ID, only used to correlate log lines
    pub jti: String,
}

impl SessionService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_minutes: config.expiry_minutes,
        }
    }

    /// Issue a token for `username` valid from now.
    pub fn issue(&self, username: &str) -> Result<String, ServiceError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let expires_at = Duration::try_minutes(self.expiry_minutes)
            .and_then(|expiry| issued_at.checked_add_signed(expiry))
            .ok_or_else(|| {
                ServiceError::Internal(anyhow::anyhow!(
                    "Session expiry of {} minutes is out of range",
                    self.expiry_minutes
                ))
            })?;

        let claims = SessionClaims {
            sub: username.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Failed to encode session token: {}", e))
        })
    }

    /// Validate a token and return its claims.
    ///
    /// Malformed, tampered, wrongly-signed and expired tokens all collapse
    /// into `ServiceError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                ServiceError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn service(secret: &str) -> SessionService {
        service_with_expiry(secret, 120)
    }

    fn service_with_expiry(secret: &str, expiry_minutes: i64) -> SessionService {
        SessionService::new(&JwtConfig {
            secret: Secret::new(secret.to_string()),
            expiry_minutes,
        })
    }

    #[test]
    fn issued_token_verifies_to_username() {
        let sessions = service("test-secret");

        let token = sessions.issue("alice").unwrap();
        let claims = sessions.verify(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
    }

    #[test]
    fn token_is_valid_until_expiry() {
        let sessions = service("test-secret");
        let issued_at = Utc::now() - Duration::minutes(119);

        let token = sessions.issue_at("alice", issued_at).unwrap();
        assert!(sessions.verify(&token).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let sessions = service("test-secret");
        let issued_at = Utc::now() - Duration::hours(2) - Duration::seconds(5);

        let token = sessions.issue_at("alice", issued_at).unwrap();
        assert!(matches!(
            sessions.verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service("secret-one").issue("alice").unwrap();

        assert!(matches!(
            service("secret-two").verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let sessions = service("test-secret");

        assert!(sessions.verify("").is_err());
        assert!(sessions.verify("invalid.token.here").is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let sessions = service("test-secret");
        let token = sessions.issue("alice").unwrap();
        let forged_for_bob = sessions.issue("bob").unwrap();

        // Alice's header and signature around Bob's claims.
        let alice: Vec<&str> = token.split('.').collect();
        let bob: Vec<&str> = forged_for_bob.split('.').collect();
        let spliced = format!("{}.{}.{}", alice[0], bob[1], alice[2]);

        assert!(sessions.verify(&spliced).is_err());
    }

    #[test]
    fn out_of_range_expiry_is_an_error_not_a_panic() {
        for expiry_minutes in [i64::MAX, 200_000_000_000] {
            let sessions = service_with_expiry("test-secret", expiry_minutes);
            assert!(matches!(
                sessions.issue("alice"),
                Err(ServiceError::Internal(_))
            ));
        }
    }
}
