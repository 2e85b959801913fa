//! Row-to-response conversions.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use chirp_db::models::{FollowRow, FollowUserRow, ReactionRow, TweetRow, UserRow};
use chirp_types::api::{
    Author, FollowResponse, ReactionResponse, TweetReactionEntry, TweetResponse, UserProfile,
    UserSummary,
};
use chirp_types::models::ReactionKind;

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC, accepting RFC 3339 as well.
pub fn timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub fn reaction_kind(raw: &str) -> ReactionKind {
    ReactionKind::parse(raw).unwrap_or_else(|| {
        warn!("Unknown reaction type '{}' in database", raw);
        ReactionKind::Like
    })
}

pub fn user_profile(row: &UserRow) -> UserProfile {
    UserProfile {
        id: row.id,
        name: row.name.clone(),
        email: row.email.clone(),
        role_id: row.role_id,
        created_at: timestamp(&row.created_at),
    }
}

pub fn follow_user(row: FollowUserRow) -> UserSummary {
    UserSummary {
        id: row.id,
        name: row.name,
        email: row.email,
    }
}

pub fn follow(row: &FollowRow) -> FollowResponse {
    FollowResponse {
        id: row.id,
        follower_id: row.follower_id,
        following_id: row.following_id,
        created_at: timestamp(&row.created_at),
    }
}

pub fn tweet(row: TweetRow) -> TweetResponse {
    TweetResponse {
        id: row.id,
        user_id: row.user_id,
        tweet: row.tweet,
        image: row.image,
        created_at: timestamp(&row.created_at),
        updated_at: timestamp(&row.updated_at),
        user: None,
    }
}

pub fn tweet_with_author(row: TweetRow) -> TweetResponse {
    let author = Author {
        id: row.user_id,
        name: row.author_name.clone(),
    };
    TweetResponse {
        user: Some(author),
        ..tweet(row)
    }
}

pub fn reaction(row: &ReactionRow) -> ReactionResponse {
    ReactionResponse {
        id: row.reaction_id,
        kind: reaction_kind(&row.kind),
        user_id: row.user_id,
        tweet_id: row.tweet_id,
        created_at: timestamp(&row.created_at),
        updated_at: timestamp(&row.updated_at),
    }
}

pub fn tweet_reaction(row: ReactionRow) -> TweetReactionEntry {
    TweetReactionEntry {
        id: row.link_id,
        kind: reaction_kind(&row.kind),
        created_at: timestamp(&row.created_at),
        updated_at: timestamp(&row.updated_at),
        user: UserSummary {
            id: row.user_id,
            name: row.user_name,
            email: row.user_email,
        },
    }
}
