use crate::{abstract_trait::JwtServiceTrait, errors::ServiceError, model::Role};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    pub token_type: String,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, exp: usize, iat: usize, token_type: String) -> Self {
        Claims {
            user_id,
            role,
            exp,
            iat,
            token_type,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub jwt_secret: String,
}

impl JwtConfig {
    pub fn new(jwt_secret: &str) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.to_string(),
        }
    }
}

impl JwtServiceTrait for JwtConfig {
    fn verify_token(&self, token: &str, expected_type: &str) -> Result<Claims, ServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(ServiceError::Jwt)?;

        let current_time = Utc::now().timestamp() as usize;

        if token_data.claims.exp < current_time {
            return Err(ServiceError::TokenExpired);
        }

        if token_data.claims.token_type != expected_type {
            return Err(ServiceError::InvalidTokenType);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn sign(secret: &str, token_type: &str, ttl: Duration) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims::new(
            user_id,
            Role::Admin,
            (now + ttl).timestamp() as usize,
            now.timestamp() as usize,
            token_type.to_string(),
        );
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (user_id, token)
    }

    #[test]
    fn verifies_access_token_and_returns_claims() {
        let jwt = JwtConfig::new("secret");
        let (user_id, token) = sign("secret", "access", Duration::minutes(5));

        let claims = jwt.verify_token(&token, "access").unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn rejects_wrong_token_type() {
        let jwt = JwtConfig::new("secret");
        let (_, token) = sign("secret", "refresh", Duration::minutes(5));

        assert!(matches!(
            jwt.verify_token(&token, "access"),
            Err(ServiceError::InvalidTokenType)
        ));
    }

    #[test]
    fn rejects_foreign_signature_and_expired_tokens() {
        let jwt = JwtConfig::new("secret");
        let (_, forged) = sign("other-secret", "access", Duration::minutes(5));
        let (_, expired) = sign("secret", "access", Duration::hours(-2));

        assert!(matches!(
            jwt.verify_token(&forged, "access"),
            Err(ServiceError::Jwt(_))
        ));
        assert!(jwt.verify_token(&expired, "access").is_err());
    }
}
