use std::env;

use crate::database::RedisService;
use crate::user::model::Role;
use crate::utils::error::CustomError;
use actix_web::{Error, HttpMessage, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub role: String,
    pub exp: usize,
}

const SESSION_TTL_SECONDS: u64 = 86400;

fn jwt_secret() -> Result<String, CustomError> {
    env::var("JWT_SECRET")
        .map_err(|_| CustomError::InternalServerError("JWT_SECRET must be set".to_string()))
}

/// Sign claims for a user. Split out so token contents can be tested
/// without Redis or environment state.
pub fn sign_claims(user_id: &str, role: &Role, secret: &str) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(24))
        .ok_or_else(|| CustomError::InternalServerError("Clock overflow".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        role: role.as_str().to_string(),
        exp: expiration,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
}

/// Create a JWT token and store the session in Redis
pub async fn create_token_with_session(
    user_id: &str,
    role: &Role,
    redis_service: &RedisService,
) -> Result<String, CustomError> {
    let token = sign_claims(user_id, role, &jwt_secret()?)?;

    redis_service
        .store_session(user_id, &token, SESSION_TTL_SECONDS)
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to store session: {}", e)))?;

    Ok(token)
}

/// Create a JWT token without a Redis session (fallback mode)
pub fn create_token(user_id: &str, role: &Role) -> Result<String, CustomError> {
    sign_claims(user_id, role, &jwt_secret()?)
}

/// Verify JWT token and validate the session in Redis
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token();
    let secret = match env::var("JWT_SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            return Err((
                actix_web::error::ErrorInternalServerError("JWT_SECRET must be set"),
                req,
            ));
        }
    };

    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(_) => return Err((actix_web::error::ErrorUnauthorized("Invalid token"), req)),
    };

    let user_id = &token_data.claims.id;

    let redis_service = match req.app_data::<web::Data<RedisService>>() {
        Some(service) => service,
        None => {
            // No Redis wired in; accept the JWT on its own
            req.extensions_mut().insert(token_data.claims);
            return Ok(req);
        }
    };

    match redis_service.validate_session(token).await {
        Ok(Some(stored_user_id)) => {
            if stored_user_id == *user_id {
                req.extensions_mut().insert(token_data.claims);
                Ok(req)
            } else {
                Err((actix_web::error::ErrorUnauthorized("Session mismatch"), req))
            }
        }
        Ok(None) => Err((
            actix_web::error::ErrorUnauthorized("Session expired or invalid"),
            req,
        )),
        Err(_) => {
            // Redis unavailable; fall back to JWT-only validation
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
    }
}

/// Invalidate a user's session (logout)
pub async fn invalidate_session(
    user_id: &str,
    redis_service: &RedisService,
) -> Result<(), CustomError> {
    redis_service.invalidate_session(user_id).await.map_err(|e| {
        CustomError::InternalServerError(format!("Failed to invalidate session: {}", e))
    })
}

/// Pull authenticated claims out of request extensions (set by
/// `verify_token`).
pub fn authenticated_claims(req: &actix_web::HttpRequest) -> Result<Claims, CustomError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| CustomError::UnauthorizedError("Missing authentication".to_string()))
}

/// Role gate: the bearer's role must be in the route's allow-list,
/// otherwise 403.
pub fn require_role(
    req: &actix_web::HttpRequest,
    allowed: &[Role],
) -> Result<Claims, CustomError> {
    let claims = authenticated_claims(req)?;
    let role = Role::parse(&claims.role)
        .ok_or_else(|| CustomError::ForbiddenError("Unknown role".to_string()))?;

    if !allowed.contains(&role) {
        return Err(CustomError::ForbiddenError(
            "You do not have access to this resource".to_string(),
        ));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_claims(token: &str, secret: &str) -> Claims {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .unwrap()
        .claims
    }

    #[test]
    fn signed_token_carries_id_and_role() {
        let token = sign_claims("64f0c3e2a1b2c3d4e5f60718", &Role::Brand, "test-secret").unwrap();
        let claims = decode_claims(&token, "test-secret");
        assert_eq!(claims.id, "64f0c3e2a1b2c3d4e5f60718");
        assert_eq!(claims.role, "brand");
        assert!(claims.exp > chrono::Utc::now().timestamp() as usize);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let token = sign_claims("u1", &Role::Influencer, "secret-a").unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    fn request_with_role(role: &str) -> actix_web::HttpRequest {
        let req = actix_web::test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims {
            id: "u1".to_string(),
            role: role.to_string(),
            exp: 0,
        });
        req
    }

    #[test]
    fn role_outside_allow_list_is_forbidden() {
        let req = request_with_role("influencer");
        let err = require_role(&req, &[Role::Brand, Role::Agency]).unwrap_err();
        assert!(matches!(err, CustomError::ForbiddenError(_)));
    }

    #[test]
    fn role_in_allow_list_passes() {
        let req = request_with_role("agency");
        let claims = require_role(&req, &[Role::Brand, Role::Agency]).unwrap();
        assert_eq!(claims.role, "agency");
    }

    #[test]
    fn unknown_role_is_forbidden() {
        let req = request_with_role("superuser");
        let err = require_role(&req, &[Role::Brand]).unwrap_err();
        assert!(matches!(err, CustomError::ForbiddenError(_)));
    }

    #[test]
    fn missing_claims_are_unauthorized() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let err = require_role(&req, &[Role::Brand]).unwrap_err();
        assert!(matches!(err, CustomError::UnauthorizedError(_)));
    }
}
