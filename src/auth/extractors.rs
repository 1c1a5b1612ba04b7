use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::{JwtKeys, TokenKind};
use crate::entities::{Role, StoredUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer token and loads the live user record, so role changes
/// and deletions apply on the next request.
#[derive(Debug)]
pub struct CurrentUser(pub StoredUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Invalid auth scheme"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::unauthorized("Access token required"));
        }

        let user = state
            .users()
            .get(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

        Ok(CurrentUser(user))
    }
}

impl CurrentUser {
    pub fn require(&self, role: Role) -> Result<&StoredUser, ApiError> {
        self.require_any(&[role])
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<&StoredUser, ApiError> {
        if roles.contains(&self.0.role) {
            Ok(&self.0)
        } else {
            Err(ApiError::forbidden("Insufficient role"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(state: &AppState, auth_header: Option<&str>) -> Result<CurrentUser, ApiError> {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = auth_header {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    async fn seed_user(state: &AppState, role: Role) -> StoredUser {
        let user = StoredUser {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role,
        };
        state.users().create(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::in_memory();
        let err = extract(&state, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn valid_token_loads_the_live_user() {
        let state = AppState::in_memory();
        seed_user(&state, Role::Buyer).await;
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_access("ada@example.com").unwrap();

        let current = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(current.0.id, "u1");
    }

    #[tokio::test]
    async fn refresh_token_cannot_authenticate_a_request() {
        let state = AppState::in_memory();
        seed_user(&state, Role::Buyer).await;
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_refresh("ada@example.com").unwrap();

        let err = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn deleted_user_is_unauthorized_even_with_a_valid_token() {
        let state = AppState::in_memory();
        seed_user(&state, Role::Buyer).await;
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_access("ada@example.com").unwrap();
        state.users().delete("ada@example.com").await.unwrap();

        let err = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn role_guards() {
        let state = AppState::in_memory();
        let user = seed_user(&state, Role::Employee).await;
        let current = CurrentUser(user);
        assert!(current.require(Role::Employee).is_ok());
        assert!(current.require(Role::Admin).is_err());
        assert!(current.require_any(&[Role::Employee, Role::Admin]).is_ok());
    }
}
