use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_DURATION_SECS: i64 = 30 * 60; // 30 minutes

/// JWT claims. `sub` is the user's email.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

/// Verifies bearer tokens minted by the account service (HS256, shared
/// secret).
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Mint a token for `email`. The API itself only verifies; issuing
    /// belongs to the account service sharing this secret.
    pub fn create_token(&self, email: &str) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(TOKEN_DURATION_SECS);

        let claims = Claims {
            sub: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a JWT token. Returns claims if valid and not expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("test-secret-key", "neoradar".to_string())
    }

    #[test]
    fn roundtrip_token() {
        let svc = test_service();
        let token = svc.create_token("ada@example.com").unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "ada@example.com");
        assert_eq!(claims.iss, "neoradar");
    }

    #[test]
    fn rejects_invalid_token() {
        assert!(test_service().verify_token("garbage").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let svc1 = JwtService::new("secret-a", "neoradar".to_string());
        let svc2 = JwtService::new("secret-b", "neoradar".to_string());
        let token = svc1.create_token("ada@example.com").unwrap();
        assert!(svc2.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_foreign_issuer() {
        let other = JwtService::new("test-secret-key", "someone-else".to_string());
        let token = other.create_token("ada@example.com").unwrap();
        assert!(test_service().verify_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let svc = test_service();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "ada@example.com".to_string(),
            exp: now - 3600,
            iat: now - 7200,
            iss: "neoradar".to_string(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &svc.encoding_key).unwrap();
        assert!(svc.verify_token(&token).is_err());
    }

    #[test]
    fn token_expiry_is_30m() {
        let svc = test_service();
        let token = svc.create_token("ada@example.com").unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }
}
