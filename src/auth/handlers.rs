use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        repo_types::User,
        services::{hash_password, is_valid_email, verify_password, JwtKeys},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let username = payload.username.trim();
    let email = payload.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, username, &email, &hash).await {
        Ok(u) => u,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(username, email = %email, "username or email already registered");
            return Err(AppError::Conflict("Username or email already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            token,
            user: PublicUser {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(payload) = payload?;
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Username and password required".into()));
    }

    let Some(user) = User::find_by_username(&state.db, username).await? else {
        warn!(username, "login unknown username");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.username)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serialization_has_no_hash() {
        let response = AuthResponse {
            message: "ok",
            token: "t".into(),
            user: PublicUser {
                id: uuid::Uuid::new_v4(),
                username: "ana".into(),
                email: "test@example.com".into(),
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"token\":\"t\""));
        assert!(!json.contains("password"));
    }
}
