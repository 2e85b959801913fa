use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use tracing::info;

use chirp_types::api::{
    CreateReactionRequest, MessageResponse, ReactionCreatedResponse, TweetReactionsResponse,
};
use chirp_types::models::ReactionKind;

use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, PathId};
use crate::middleware::roles;
use crate::state::AppState;
use crate::views;

/// React to a tweet. One reaction per user and tweet, whatever its type.
pub async fn create_reaction(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): JsonBody<CreateReactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard_account(&jar, roles::ANY)?;

    let (Some(tweet_id), Some(kind)) = (req.tweet_id, req.kind) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    if state.db.get_tweet(tweet_id)?.is_none() {
        return Err(ApiError::not_found("Tweet not found"));
    }

    let kind = ReactionKind::parse(&kind).ok_or_else(|| ApiError::bad_request("Invalid reaction type"))?;

    let reaction = state
        .db
        .add_reaction(tweet_id, claims.id, kind.as_str())?
        .ok_or_else(|| ApiError::conflict("Reaction already exists"))?;
    info!(tweet_id, user_id = claims.id, %kind, "Reaction added");

    Ok((
        StatusCode::CREATED,
        Json(ReactionCreatedResponse {
            message: "Reaction added successfully".into(),
            reaction: views::reaction(&reaction),
        }),
    ))
}

/// Public list of reactions on a tweet.
pub async fn list_reactions(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
) -> ApiResult<impl IntoResponse> {
    if state.db.get_tweet(id)?.is_none() {
        return Err(ApiError::not_found("Tweet not found"));
    }

    let data = state
        .db
        .reactions_for_tweet(id)?
        .into_iter()
        .map(views::tweet_reaction)
        .collect();

    Ok(Json(TweetReactionsResponse { tweet_id: id, data }))
}

/// Remove the caller's own reaction from a tweet.
pub async fn delete_reaction(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::ANY)?;

    if state.db.get_tweet(id)?.is_none() {
        return Err(ApiError::not_found("Tweet not found"));
    }

    if !state.db.remove_reaction(id, claims.id)? {
        return Err(ApiError::not_found("Reaction not found for this user"));
    }
    info!(tweet_id = id, user_id = claims.id, "Reaction removed");

    Ok(Json(MessageResponse::new("Reaction deleted successfully")))
}
