use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
};

/// Validates ID tokens issued by the auth provider.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &SecretString) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
        }
    }

    /// Signs a token the way the auth provider's emulator does; used by local
    /// tooling and tests.
    pub fn issue_token(&self, user_id: &str, email: &str, expiration_hours: i64) -> AppResult<String> {
        let claims = Claims::new(user_id, email, expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("ID token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("ID token signature is invalid".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_jwt_issue_and_validate() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.auth_jwt_secret);

        let token = jwt_service
            .issue_token("uid-1", "student@example.com", 1)
            .unwrap();
        assert!(!token.is_empty());

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.email, "student@example.com");
    }

    #[test]
    fn test_jwt_invalid_token() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.auth_jwt_secret);

        let result = jwt_service.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_jwt_rejects_foreign_signature() {
        let ours = JwtService::new(&SecretString::from("ours".to_string()));
        let theirs = JwtService::new(&SecretString::from("theirs".to_string()));

        let token = theirs.issue_token("uid-1", "a@example.com", 1).unwrap();
        match ours.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("signature")),
            other => panic!("Expected Unauthorized error, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_jwt_rejects_expired_token() {
        let jwt_service = JwtService::new(&SecretString::from("secret".to_string()));
        let token = jwt_service.issue_token("uid-1", "a@example.com", -2).unwrap();

        match jwt_service.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("Expected Unauthorized error, got {:?}", other.map(|c| c.sub)),
        }
    }
}
