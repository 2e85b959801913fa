use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use tracing::info;

use chirp_types::api::{FollowCountResponse, FollowCreatedResponse, FollowListResponse, MessageResponse};

use crate::error::{ApiError, ApiResult};
use crate::extract::PathId;
use crate::middleware::roles;
use crate::state::AppState;
use crate::views;

/// Followers and followings of a user.
pub async fn list_follows(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    state.guard(&jar, roles::ANY)?;

    if state.db.get_user_by_id(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let followers = state.db.followers_of(id)?.into_iter().map(views::follow_user).collect();
    let followings = state.db.followings_of(id)?.into_iter().map(views::follow_user).collect();

    Ok(Json(FollowListResponse { followers, followings }))
}

pub async fn follow(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard_account(&jar, roles::ANY)?;

    if claims.id == id {
        return Err(ApiError::bad_request("You cannot follow yourself"));
    }

    if state.db.get_user_by_id(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let follow = state
        .db
        .create_follow(claims.id, id)?
        .ok_or_else(|| ApiError::conflict("You are already following this user"))?;
    info!(follower_id = claims.id, following_id = id, "Followed");

    Ok((
        StatusCode::CREATED,
        Json(FollowCreatedResponse {
            message: "Followed successfully".into(),
            follow: views::follow(&follow),
        }),
    ))
}

pub async fn unfollow(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::ANY)?;

    if !state.db.delete_follow(claims.id, id)? {
        return Err(ApiError::not_found("You are not following this user"));
    }
    info!(follower_id = claims.id, following_id = id, "Unfollowed");

    Ok(Json(MessageResponse::new("Unfollowed successfully")))
}

/// Public follower/following counts.
pub async fn follow_count(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
) -> ApiResult<impl IntoResponse> {
    if state.db.get_user_by_id(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let (followers_count, followings_count) = state.db.follow_counts(id)?;

    Ok(Json(FollowCountResponse {
        user_id: id,
        followers_count,
        followings_count,
    }))
}
