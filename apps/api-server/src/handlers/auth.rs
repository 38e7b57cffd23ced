//! Account handlers: the identities that own posts.

use actix_web::{HttpResponse, web};

use blog_core::domain::User;
use blog_core::error::RepoError;
use blog_core::ports::AuthError;
use blog_core::validation::validate_credentials;
use blog_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, vec!["user".to_string()])?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_credentials(&req.username, &req.password)?;
    let username = req.username.trim().to_string();

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let user = match state.users.save(User::new(username, password_hash)).await {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::Conflict("Username already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        username: user.username,
    }))
}

/// DELETE /api/auth/me - removes the account together with all of its posts.
pub async fn delete_me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state.users.delete(identity.user_id).await?;
    tracing::info!(user_id = %identity.user_id, username = %identity.username, "User deleted with their posts");

    Ok(HttpResponse::NoContent().finish())
}
