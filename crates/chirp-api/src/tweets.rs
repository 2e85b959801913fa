use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use tracing::{debug, info};

use chirp_db::TweetUpdate;
use chirp_types::api::{
    FeedResponse, FeedTweet, MessageResponse, TweetEnvelope, TweetListResponse, TweetSearchQuery,
    UserSummary, UserTweetsResponse,
};
use chirp_types::models::ReactionKind;

use crate::error::{ApiError, ApiResult};
use crate::extract::{PathId, QueryParams};
use crate::media::ImageUpload;
use crate::middleware::roles;
use crate::state::AppState;
use crate::views;

/// Text fields and the optional image of a multipart tweet form.
#[derive(Debug, Default)]
struct TweetForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl TweetForm {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Self> {
        let mut multipart =
            multipart.map_err(|_| ApiError::bad_request("Invalid content type, expected multipart/form-data"))?;

        let mut form = TweetForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// A trimmed, non-blank text field.
    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn flag(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|v| v == "true")
    }
}

/// Validate and persist an uploaded image, returning its public path.
async fn store_image(state: &AppState, upload: &ImageUpload) -> ApiResult<String> {
    upload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(state.media.save(upload).await?)
}

/// Public, newest first, optionally filtered by `?search=`.
pub async fn list_tweets(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<TweetSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let search = query.search.unwrap_or_default();
    let data = state
        .db
        .search_tweets(search.trim())?
        .into_iter()
        .map(views::tweet_with_author)
        .collect();

    Ok(Json(TweetListResponse { data }))
}

pub async fn create_tweet(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard_account(&jar, roles::AUTHORS)?;
    let form = TweetForm::read(multipart).await?;

    let text = form
        .text("tweet")
        .ok_or_else(|| ApiError::validation("Tweet text is required"))?;

    let image = match &form.image {
        Some(upload) => Some(store_image(&state, upload).await?),
        None => None,
    };

    let row = match state.db.create_tweet(claims.id, &text, image.as_deref()) {
        Ok(row) => row,
        Err(e) => {
            if let Some(path) = &image {
                state.media.remove(path).await;
            }
            return Err(e.into());
        }
    };
    info!(tweet_id = row.id, user_id = claims.id, has_image = row.image.is_some(), "Tweet created");

    Ok((StatusCode::CREATED, Json(TweetEnvelope { tweet: views::tweet(row) })))
}

pub async fn get_tweet(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    state.guard(&jar, roles::ANY)?;

    let tweet = state
        .db
        .get_tweet(id)?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    Ok(Json(views::tweet(tweet)))
}

/// Owner-only edit. Accepts `new_tweet`, `image` and `remove_image=true`.
pub async fn update_tweet(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::AUTHORS)?;
    let form = TweetForm::read(multipart).await?;

    let tweet = state
        .db
        .get_tweet(id)?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    if tweet.user_id != claims.id {
        return Err(ApiError::forbidden("Access denied: cannot edit other user's tweets"));
    }

    let mut update = TweetUpdate::default();
    // Image file to delete once the row no longer points at it.
    let mut replaced = None;

    if let Some(text) = form.text("new_tweet") {
        if text != tweet.tweet {
            update.text = Some(text);
        }
    }

    if form.flag("remove_image") && tweet.image.is_some() {
        update.image = Some(None);
        replaced = tweet.image.clone();
    }

    if let Some(upload) = &form.image {
        let path = store_image(&state, upload).await?;
        update.image = Some(Some(path));
        replaced = tweet.image.clone();
    }

    if update.is_empty() {
        return Err(ApiError::bad_request("No valid fields to update"));
    }

    let updated = match state.db.update_tweet(id, &update) {
        Ok(Some(row)) => row,
        failed => {
            if let Some(Some(path)) = &update.image {
                state.media.remove(path).await;
            }
            return Err(match failed {
                Err(e) => e.into(),
                Ok(_) => ApiError::not_found("Tweet not found"),
            });
        }
    };

    if let Some(old) = replaced {
        state.media.remove(&old).await;
    }
    info!(tweet_id = id, user_id = claims.id, "Tweet updated");

    Ok(Json(TweetEnvelope { tweet: views::tweet(updated) }))
}

/// Owner or Admin.
pub async fn delete_tweet(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::AUTHORS)?;

    let tweet = state
        .db
        .get_tweet(id)?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    if tweet.user_id != claims.id && !claims.is_admin() {
        return Err(ApiError::forbidden("Access denied: cannot delete other user's tweets"));
    }

    if !state.db.delete_tweet(id)? {
        return Err(ApiError::not_found("Tweet not found"));
    }
    if let Some(image) = &tweet.image {
        state.media.remove(image).await;
    }
    info!(tweet_id = id, user_id = claims.id, "Tweet deleted");

    Ok(Json(MessageResponse::new("Tweet deleted successfully")))
}

/// Tweets from everyone the caller follows, with their reaction types.
pub async fn feed(State(state): State<AppState>, jar: CookieJar) -> ApiResult<impl IntoResponse> {
    let claims = state.guard(&jar, roles::ANY)?;

    let (_, followings) = state.db.follow_counts(claims.id)?;
    if followings == 0 {
        return Ok(Json(FeedResponse {
            tweets: vec![],
            message: Some("You don't follow anyone yet".into()),
        }));
    }

    let rows = state.db.feed_for(claims.id)?;
    if rows.is_empty() {
        return Ok(Json(FeedResponse {
            tweets: vec![],
            message: Some("No tweets found from followed users".into()),
        }));
    }

    let mut reactions: HashMap<i64, Vec<ReactionKind>> = HashMap::new();
    for (tweet_id, kind) in state.db.feed_reaction_kinds(claims.id)? {
        reactions.entry(tweet_id).or_default().push(views::reaction_kind(&kind));
    }
    debug!(user_id = claims.id, tweets = rows.len(), "Feed assembled");

    let tweets = rows
        .into_iter()
        .map(|row| FeedTweet {
            id: row.id,
            user_id: row.user_id,
            reactions: reactions.remove(&row.id).unwrap_or_default(),
            user: UserSummary {
                id: row.user_id,
                name: row.author_name,
                email: row.author_email,
            },
            tweet: row.tweet,
            image: row.image,
            created_at: views::timestamp(&row.created_at),
            updated_at: views::timestamp(&row.updated_at),
        })
        .collect();

    Ok(Json(FeedResponse { tweets, message: None }))
}

pub async fn user_tweets(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathId,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    state.guard(&jar, roles::ANY)?;

    if state.db.get_user_by_id(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let tweets = state.db.tweets_by_user(id)?.into_iter().map(views::tweet).collect();
    Ok(Json(UserTweetsResponse { tweets }))
}
