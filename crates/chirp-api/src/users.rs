//! Admin-only user management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use tracing::info;

use chirp_db::UserUpdate;
use chirp_types::api::{
    CreateUserRequest, MessageResponse, UpdateUserRequest, UserCounts, UserDetail, UserEnvelope,
    UsersResponse,
};
use chirp_types::models::Role;

use crate::auth::present;
use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, PathId};
use crate::middleware::roles;
use crate::password::MIN_PASSWORD_LEN;
use crate::state::AppState;
use crate::views;

pub async fn list_users(State(state): State<AppState>, jar: CookieJar) -> ApiResult<impl IntoResponse> {
    state.guard(&jar, roles::ADMIN)?;

    let users = state.db.list_users()?.iter().map(views::user_profile).collect();
    Ok(Json(UsersResponse { users }))
}

/// Create an account with any role. Unlike registration this does not start a
/// session for the new user.
pub async fn create_user(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = state.guard(&jar, roles::ADMIN)?;

    let (Some(name), Some(email), Some(password), Some(confirm), Some(role_id)) = (
        present(req.name),
        present(req.email),
        present(req.password),
        present(req.confirm_password),
        req.role_id,
    ) else {
        return Err(ApiError::bad_request("Name, email, password and role are all required"));
    };

    let role = Role::from_id(role_id).ok_or_else(|| ApiError::bad_request("Unknown role"))?;

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
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash = state.passwords.hash(&password)?;
    let user = state.db.create_user(name.trim(), email, &password_hash, role.id())?;
    info!(admin_id = admin.id, user_id = user.id, %role, "User created by admin");

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User created successfully".into(),
            user: views::user_profile(&user),
        }),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    state.guard(&jar, roles::ADMIN)?;

    let user = state
        .db
        .get_user_by_id(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let tweets = state.db.tweets_by_user(id)?.into_iter().map(views::tweet).collect();
    let counts = state.db.user_counts(id)?;

    Ok(Json(UserDetail {
        profile: views::user_profile(&user),
        tweets,
        counts: UserCounts {
            tweets: counts.tweets,
            followers: counts.followers,
            followings: counts.followings,
            reactions: counts.reactions,
        },
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = state.guard(&jar, roles::ADMIN)?;

    let user = state
        .db
        .get_user_by_id(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut update = UserUpdate::default();

    if let Some(name) = req.name {
        let trimmed = name.trim();
        if !trimmed.is_empty() && trimmed != user.name {
            update.name = Some(trimmed.to_string());
        }
    }

    if let Some(role) = req.role_id.and_then(Role::from_id) {
        update.role_id = Some(role.id());
    }

    if update.is_empty() {
        return Err(ApiError::bad_request("No valid fields to update"));
    }

    let updated = state
        .db
        .update_user(id, &update)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    info!(admin_id = admin.id, user_id = id, role_id = updated.role_id, "User updated by admin");

    Ok(Json(UserEnvelope {
        message: "Profile updated".into(),
        user: views::user_profile(&updated),
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let admin = state.guard(&jar, roles::ADMIN)?;

    if !delete_account(&state, id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(admin_id = admin.id, user_id = id, "User deleted by admin");

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Delete a user and the image files of their tweets. Returns false if the
/// user did not exist.
pub(crate) async fn delete_account(state: &AppState, id: i64) -> ApiResult<bool> {
    let images: Vec<String> = state
        .db
        .tweets_by_user(id)?
        .into_iter()
        .filter_map(|t| t.image)
        .collect();

    if !state.db.delete_user(id)? {
        return Ok(false);
    }

    for image in images {
        state.media.remove(&image).await;
    }
    Ok(true)
}
