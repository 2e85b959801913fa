//! Self-service account endpoints. Any role may use them, but only on their
//! own account.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use tracing::info;

use chirp_db::UserUpdate;
use chirp_types::api::{MessageResponse, UpdateProfileRequest, UserEnvelope};

use crate::auth::present;
use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, PathId};
use crate::middleware::{expired_session_cookie, roles};
use crate::password::MIN_PASSWORD_LEN;
use crate::state::AppState;
use crate::users::delete_account;
use crate::views;

pub async fn get_profile(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::ANY)?;
    if claims.id != id {
        return Err(ApiError::forbidden("Access denied: cannot view other user's data"));
    }

    let user = state
        .db
        .get_user_by_id(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(views::user_profile(&user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::ANY)?;
    if claims.id != id {
        return Err(ApiError::forbidden("Access denied: cannot edit other user's data"));
    }

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

    if let Some(new_password) = req.new_password {
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::bad_request(format!(
                "New password must be at least {} chars",
                MIN_PASSWORD_LEN
            )));
        }
        if req.confirm_password.as_deref() != Some(new_password.as_str()) {
            return Err(ApiError::bad_request("Password confirmation does not match"));
        }
        let old_password = present(req.old_password)
            .ok_or_else(|| ApiError::bad_request("Old password required to change password"))?;
        if !state.passwords.verify(&old_password, &user.password) {
            return Err(ApiError::unauthorized("Old password is incorrect"));
        }
        update.password = Some(state.passwords.hash(&new_password)?);
    }

    if update.is_empty() {
        return Err(ApiError::bad_request("No valid fields to update"));
    }

    // Name and password land in one statement.
    let updated = state
        .db
        .update_user(id, &update)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(
        user_id = id,
        password_changed = update.password.is_some(),
        "Profile updated"
    );

    Ok(Json(UserEnvelope {
        message: "Profile updated".into(),
        user: views::user_profile(&updated),
    }))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::ANY)?;
    if claims.id != id {
        return Err(ApiError::forbidden("Access denied: cannot delete other user's data"));
    }

    if !delete_account(&state, id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id = id, "Account deleted by owner");

    Ok((
        jar.add(expired_session_cookie(state.secure_cookies)),
        Json(MessageResponse::new("User deleted successfully")),
    ))
}
