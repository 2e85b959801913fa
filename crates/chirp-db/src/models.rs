//! Database row types. These map directly to SQLite rows and are distinct
//! from the chirp-types API models.
//! Timestamps stay as SQLite text (`YYYY-MM-DD HH:MM:SS`, UTC).

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: i64,
    pub token: Option<String>,
    pub created_at: String,
}

/// A tweet joined with its author.
#[derive(Debug, Clone)]
pub struct TweetRow {
    pub id: i64,
    pub user_id: i64,
    pub tweet: String,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone)]
pub struct FollowRow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: String,
}

/// The other end of a follow edge.
#[derive(Debug, Clone)]
pub struct FollowUserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A reaction together with the join record that attaches it to a tweet and
/// the reacting user.
#[derive(Debug, Clone)]
pub struct ReactionRow {
    pub link_id: i64,
    pub reaction_id: i64,
    pub tweet_id: i64,
    pub user_id: i64,
    pub kind: String,
    pub user_name: String,
    pub user_email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCountsRow {
    pub tweets: i64,
    pub followers: i64,
    pub followings: i64,
    pub reactions: i64,
}
