use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    AuthResponse, LoginRequest, MeResponse, PublicUser, RefreshRequest, RegisterRequest,
};
use super::extractors::CurrentUser;
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use crate::entities::{Role, StoredUser};
use crate::error::{ApiError, ApiResult};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;
use crate::store::{Entity, StoreError};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn issue_tokens(keys: &JwtKeys, user: &StoredUser) -> ApiResult<AuthResponse> {
    let key = user.storage_key();
    let token = keys.sign_access(&key)?;
    let refresh_token = keys.sign_refresh(&key)?;
    Ok(AuthResponse {
        user: PublicUser::from(user),
        token,
        refresh_token,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name, email, and password are required"));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if state.users().exists(&payload.email).await? {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email: payload.email.clone(),
        password_hash: hash_password(&payload.password)?,
        role: Role::Buyer,
    };

    // The exists check above is the friendly path; the store's conflict error
    // is the backstop for check-then-create races.
    state.users().create(&user).await.map_err(|e| match e {
        StoreError::Conflict(_) => ApiError::conflict("A user with this email already exists"),
        other => other.into(),
    })?;

    let keys = JwtKeys::from_ref(&state);
    let response = issue_tokens(&keys, &user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(ok(response))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Invalid email"));
    }

    let user = state.users().get(&payload.email).await?.ok_or_else(|| {
        warn!(email = %payload.email, "login with unknown email");
        ApiError::unauthorized("Invalid credentials")
    })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login with invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let response = issue_tokens(&keys, &user)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(ok(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let user = state
        .users()
        .get(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    Ok(ok(issue_tokens(&keys, &user)?))
}

pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<Json<ApiResponse<MeResponse>>> {
    Ok(ok(MeResponse {
        user: PublicUser::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada Lovelace".into(),
            email: email.into(),
            password: "difference-engine".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = AppState::in_memory();

        let Json(registered) = register(
            State(state.clone()),
            Json(register_payload("Ada@Example.com")),
        )
        .await
        .unwrap();
        let auth = registered.data.unwrap();
        assert_eq!(auth.user.email, "ada@example.com");
        assert_eq!(auth.user.role, Role::Buyer);
        assert!(!auth.token.is_empty());

        let Json(logged_in) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".into(),
                password: "difference-engine".into(),
            }),
        )
        .await
        .unwrap();
        assert!(logged_in.success);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let state = AppState::in_memory();
        register(State(state.clone()), Json(register_payload("ada@example.com")))
            .await
            .unwrap();
        let err = register(State(state.clone()), Json(register_payload("ADA@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let state = AppState::in_memory();

        let err = register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "Ada".into(),
                email: "not-an-email".into(),
                password: "difference-engine".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "short".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let state = AppState::in_memory();
        register(State(state.clone()), Json(register_payload("ada@example.com")))
            .await
            .unwrap();

        let unknown = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "nobody@example.com".into(),
                password: "difference-engine".into(),
            }),
        )
        .await
        .unwrap_err();
        let wrong = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn refresh_rotates_the_pair() {
        let state = AppState::in_memory();
        let Json(registered) = register(
            State(state.clone()),
            Json(register_payload("ada@example.com")),
        )
        .await
        .unwrap();
        let auth = registered.data.unwrap();

        let Json(refreshed) = refresh(
            State(state.clone()),
            Json(RefreshRequest {
                refresh_token: auth.refresh_token,
            }),
        )
        .await
        .unwrap();
        let rotated = refreshed.data.unwrap();
        assert!(!rotated.token.is_empty());
        assert!(!rotated.refresh_token.is_empty());

        // An access token is not accepted in the refresh slot.
        let err = refresh(
            State(state.clone()),
            Json(RefreshRequest {
                refresh_token: rotated.token,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
