use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use tracing::info;

use chirp_db::models::UserRow;
use chirp_types::api::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse};
use chirp_types::models::Role;

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::middleware::{SESSION_COOKIE, expired_session_cookie, session_cookie};
use crate::password::MIN_PASSWORD_LEN;
use crate::state::AppState;
use crate::token::Identity;
use crate::views;

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(name), Some(email), Some(password), Some(confirm)) = (
        present(req.name),
        present(req.email),
        present(req.password),
        present(req.confirm_password),
    ) else {
        return Err(ApiError::validation("Name, email, password and confirmation are required"));
    };

    if password != confirm {
        return Err(ApiError::validation("Password doesn't match"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} chars",
            MIN_PASSWORD_LEN
        )));
    }

    let email = email.trim();
    if state.db.get_user_by_email(email)?.is_some() {
        return Err(ApiError::conflict("User already registered, please login"));
    }

    let role = Role::for_registration(req.role_id);
    let password_hash = state.passwords.hash(&password)?;
    let user = state.db.create_user(name.trim(), email, &password_hash, role.id())?;

    let token = start_session(&state, &user)?;
    info!(user_id = user.id, %role, "User registered");

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token.clone(), state.secure_cookies)),
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user: views::user_profile(&user),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let user = state
        .db
        .get_user_by_email(email.trim())?
        .ok_or_else(|| ApiError::not_found("User not registered"))?;

    if !state.passwords.verify(&password, &user.password) {
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let token = start_session(&state, &user)?;
    info!(user_id = user.id, "User logged in");

    Ok((
        jar.add(session_cookie(token.clone(), state.secure_cookies)),
        Json(LoginResponse {
            message: "Authenticated".into(),
            token,
        }),
    ))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<impl IntoResponse> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("You are not logged in"))?;

    let claims = state
        .tokens
        .verify(&token)
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

    state.db.clear_user_token_by_email(&claims.email)?;
    info!(user_id = claims.id, "User logged out");

    Ok((
        jar.add(expired_session_cookie(state.secure_cookies)),
        Json(MessageResponse::new("Logged out")),
    ))
}

/// Issue a token for `user` and record it as their current session.
pub(crate) fn start_session(state: &AppState, user: &UserRow) -> ApiResult<String> {
    let token = state.tokens.issue(&identity(user))?;
    state.db.set_user_token(user.id, Some(&token))?;
    Ok(token)
}

pub(crate) fn identity(user: &UserRow) -> Identity {
    Identity {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role_id: user.role_id,
    }
}

/// A field that is present and not blank.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
