use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ReactionKind, Role};

// -- JWT Claims --

/// Identity carried by the session cookie. Shared by the token codec, the
/// access guard and every handler that needs the caller's id or role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

// -- Generic --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// -- Auth --

// Fields are optional so that a missing field is reported as a validation
// error by the handler rather than as a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

// -- Users --

/// A user as exposed over the API. Never carries the password hash or the
/// stored session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    pub tweets: i64,
    pub followers: i64,
    pub followings: i64,
    pub reactions: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub tweets: Vec<TweetResponse>,
    #[serde(rename = "_count")]
    pub counts: UserCounts,
}

// -- Follows --

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowCreatedResponse {
    pub message: String,
    pub follow: FollowResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowListResponse {
    pub followers: Vec<UserSummary>,
    pub followings: Vec<UserSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCountResponse {
    pub user_id: i64,
    pub followers_count: i64,
    pub followings_count: i64,
}

// -- Tweets --

#[derive(Debug, Default, Deserialize)]
pub struct TweetSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetResponse {
    pub id: i64,
    pub user_id: i64,
    pub tweet: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Author>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TweetEnvelope {
    pub tweet: TweetResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TweetListResponse {
    pub data: Vec<TweetResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserTweetsResponse {
    pub tweets: Vec<TweetResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedTweet {
    pub id: i64,
    pub user_id: i64,
    pub tweet: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
    pub reactions: Vec<ReactionKind>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub tweets: Vec<FeedTweet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// -- Reactions --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateReactionRequest {
    pub tweet_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
    pub user_id: i64,
    pub tweet_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionCreatedResponse {
    pub message: String,
    pub reaction: ReactionResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TweetReactionEntry {
    pub id: i64,
    pub user: UserSummary,
    #[serde(rename = "reactionType")]
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TweetReactionsResponse {
    pub tweet_id: i64,
    pub data: Vec<TweetReactionEntry>,
}
