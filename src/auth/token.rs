//! JSON Web Token creation, verification and the extractor that request
//! handlers use to require an authenticated caller.

// Code in this module is adapted from https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Error,
    models::{Role, User, UserID},
    state::AppState,
};

/// How long an issued token stays valid, in hours.
const TOKEN_DURATION_HOURS: i64 = 24;

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
    /// The ID of the user the token belongs to.
    pub sub: i64,
    /// The role the user had when the token was issued.
    pub role: Role,
}

impl Claims {
    /// The authenticated user's ID.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }

    /// Whether the token belongs to an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the token to belong to an admin.
    ///
    /// # Errors
    /// Returns [Error::Forbidden] for regular users.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let app_state = AppState::from_ref(state);

        let token_data = decode_jwt(bearer.token(), app_state.decoding_key())?;

        Ok(token_data.claims)
    }
}

/// The ways authentication itself can fail, separate from the app error
/// type because these are produced before a handler ever runs.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenCreation,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Not authorized, no token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::TokenCreation => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Issue a token for `user`.
pub fn encode_jwt(user: &User, encoding_key: &EncodingKey) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        exp: (now + Duration::hours(TOKEN_DURATION_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
        sub: user.id.as_i64(),
        role: user.role,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|_| AuthError::TokenCreation)
}

fn decode_jwt(token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, AuthError> {
    decode(token, decoding_key, &Validation::default()).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{DecodingKey, EncodingKey};

    use super::{decode_jwt, encode_jwt};
    use crate::models::{PasswordHash, Role, User, UserID};

    fn test_user(role: Role) -> User {
        User {
            id: UserID::new(7),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".parse().unwrap(),
            password_hash: PasswordHash::new_unchecked("notarealhash"),
            role,
            currency: "USD".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn decode_round_trips_user_id_and_role() {
        let encoding_key = EncodingKey::from_secret(b"42");
        let decoding_key = DecodingKey::from_secret(b"42");

        let token = encode_jwt(&test_user(Role::Admin), &encoding_key).unwrap();
        let claims = decode_jwt(&token, &decoding_key).unwrap().claims;

        assert_eq!(claims.sub, 7);
        assert!(claims.is_admin());
    }

    #[test]
    fn decode_fails_with_the_wrong_secret() {
        let encoding_key = EncodingKey::from_secret(b"42");
        let wrong_decoding_key = DecodingKey::from_secret(b"43");

        let token = encode_jwt(&test_user(Role::User), &encoding_key).unwrap();

        assert!(decode_jwt(&token, &wrong_decoding_key).is_err());
    }

    #[test]
    fn require_admin_rejects_regular_users() {
        let encoding_key = EncodingKey::from_secret(b"42");
        let decoding_key = DecodingKey::from_secret(b"42");

        let token = encode_jwt(&test_user(Role::User), &encoding_key).unwrap();
        let claims = decode_jwt(&token, &decoding_key).unwrap().claims;

        assert_eq!(claims.require_admin(), Err(crate::Error::Forbidden));
    }
}
