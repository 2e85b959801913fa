use crate::models::{FollowRow, FollowUserRow, ReactionRow, TweetRow, UserCountsRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_SELECT: &str =
    "SELECT id, name, email, password, role_id, token, created_at FROM users";

const TWEET_SELECT: &str =
    "SELECT t.id, t.user_id, t.tweet, t.image, t.created_at, t.updated_at, u.name, u.email
     FROM tweets t
     JOIN users u ON t.user_id = u.id";

const REACTION_SELECT: &str =
    "SELECT tr.id, r.id, tr.tweet_id, r.user_id, r.type, u.name, u.email, r.created_at, r.updated_at
     FROM tweet_reactions tr
     JOIN reactions r ON tr.reaction_id = r.id
     JOIN users u ON r.user_id = u.id";

/// Fields to change on a user; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i64>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none() && self.role_id.is_none()
    }
}

/// Fields to change on a tweet. `image: Some(None)` clears the image.
#[derive(Debug, Default, Clone)]
pub struct TweetUpdate {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
}

impl TweetUpdate {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password, role_id) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, email, password_hash, role_id],
            )?;
            let id = conn.last_insert_rowid();
            query_user(conn, "WHERE id = ?1", id)?
                .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "WHERE email = ?1", email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "WHERE id = ?1", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY id", USER_SELECT))?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply `update` in a single statement. Returns the updated row, or
    /// `None` if the user does not exist.
    pub fn update_user(&self, id: i64, update: &UserUpdate) -> Result<Option<UserRow>> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    password = COALESCE(?3, password),
                    role_id = COALESCE(?4, role_id)
                 WHERE id = ?1",
                rusqlite::params![id, update.name, update.password, update.role_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(tx, "WHERE id = ?1", id)
        })
    }

    pub fn set_user_token(&self, id: i64, token: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET token = ?2 WHERE id = ?1",
                rusqlite::params![id, token],
            )?;
            Ok(())
        })
    }

    /// Clears the stored session token. Returns false if no user has `email`.
    pub fn clear_user_token_by_email(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE users SET token = NULL WHERE email = ?1", [email])?;
            Ok(changed > 0)
        })
    }

    /// Delete a user with everything hanging off them, including other
    /// users' reactions on their tweets.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM reactions WHERE id IN (
                    SELECT tr.reaction_id FROM tweet_reactions tr
                    JOIN tweets t ON tr.tweet_id = t.id
                    WHERE t.user_id = ?1
                 )",
                [id],
            )?;
            let deleted = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    pub fn user_counts(&self, id: i64) -> Result<UserCountsRow> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM tweets WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE follower_id = ?1),
                    (SELECT COUNT(*) FROM reactions WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserCountsRow {
                        tweets: row.get(0)?,
                        followers: row.get(1)?,
                        followings: row.get(2)?,
                        reactions: row.get(3)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }

    // -- Tweets --

    pub fn create_tweet(&self, user_id: i64, text: &str, image: Option<&str>) -> Result<TweetRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tweets (user_id, tweet, image) VALUES (?1, ?2, ?3)",
                rusqlite::params![user_id, text, image],
            )?;
            let id = conn.last_insert_rowid();
            query_tweet(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Tweet {} vanished after insert", id))
        })
    }

    pub fn get_tweet(&self, id: i64) -> Result<Option<TweetRow>> {
        self.with_conn(|conn| query_tweet(conn, id))
    }

    /// Newest first. An empty `search` matches every tweet; otherwise a
    /// case-insensitive substring match on the text.
    pub fn search_tweets(&self, search: &str) -> Result<Vec<TweetRow>> {
        let pattern = format!("%{}%", escape_like(search));
        self.with_conn(|conn| {
            query_tweets(
                conn,
                "WHERE t.tweet LIKE ?1 ESCAPE '\\' ORDER BY t.created_at DESC, t.id DESC",
                [pattern.as_str()],
            )
        })
    }

    pub fn tweets_by_user(&self, user_id: i64) -> Result<Vec<TweetRow>> {
        self.with_conn(|conn| {
            query_tweets(
                conn,
                "WHERE t.user_id = ?1 ORDER BY t.created_at DESC, t.id DESC",
                [user_id],
            )
        })
    }

    /// Tweets written by anyone `follower_id` follows, newest first.
    pub fn feed_for(&self, follower_id: i64) -> Result<Vec<TweetRow>> {
        self.with_conn(|conn| {
            query_tweets(
                conn,
                "JOIN follows f ON f.following_id = t.user_id
                 WHERE f.follower_id = ?1
                 ORDER BY t.created_at DESC, t.id DESC",
                [follower_id],
            )
        })
    }

    pub fn update_tweet(&self, id: i64, update: &TweetUpdate) -> Result<Option<TweetRow>> {
        let set_image = update.image.is_some();
        let image = update.image.clone().flatten();
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE tweets SET
                    tweet = COALESCE(?2, tweet),
                    image = CASE WHEN ?3 THEN ?4 ELSE image END,
                    updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, update.text, set_image, image],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_tweet(tx, id)
        })
    }

    /// Delete a tweet and the reactions attached to it.
    pub fn delete_tweet(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM reactions WHERE id IN (
                    SELECT reaction_id FROM tweet_reactions WHERE tweet_id = ?1
                 )",
                [id],
            )?;
            let deleted = tx.execute("DELETE FROM tweets WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// `(tweet_id, reaction type)` for every reaction on a tweet in
    /// `follower_id`'s feed.
    pub fn feed_reaction_kinds(&self, follower_id: i64) -> Result<Vec<(i64, String)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT tr.tweet_id, r.type FROM tweet_reactions tr
                 JOIN reactions r ON tr.reaction_id = r.id
                 JOIN tweets t ON tr.tweet_id = t.id
                 JOIN follows f ON f.following_id = t.user_id
                 WHERE f.follower_id = ?1
                 ORDER BY tr.id",
            )?;
            let rows = stmt
                .query_map([follower_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Follows --

    /// Users following `user_id`.
    pub fn followers_of(&self, user_id: i64) -> Result<Vec<FollowUserRow>> {
        self.with_conn(|conn| {
            query_follow_users(
                conn,
                "SELECT u.id, u.name, u.email FROM follows f
                 JOIN users u ON u.id = f.follower_id
                 WHERE f.following_id = ?1
                 ORDER BY f.id",
                user_id,
            )
        })
    }

    /// Users `user_id` follows.
    pub fn followings_of(&self, user_id: i64) -> Result<Vec<FollowUserRow>> {
        self.with_conn(|conn| {
            query_follow_users(
                conn,
                "SELECT u.id, u.name, u.email FROM follows f
                 JOIN users u ON u.id = f.following_id
                 WHERE f.follower_id = ?1
                 ORDER BY f.id",
                user_id,
            )
        })
    }

    /// Insert the edge unless it already exists. `None` means the pair was
    /// already present; the check and the insert happen under one lock.
    pub fn create_follow(&self, follower_id: i64, following_id: i64) -> Result<Option<FollowRow>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO follows (follower_id, following_id) VALUES (?1, ?2)
                 ON CONFLICT(follower_id, following_id) DO NOTHING",
                rusqlite::params![follower_id, following_id],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            query_follow(conn, follower_id, following_id)
        })
    }

    pub fn delete_follow(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                rusqlite::params![follower_id, following_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// `(followers, followings)` for a user.
    pub fn follow_counts(&self, user_id: i64) -> Result<(i64, i64)> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM follows WHERE following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE follower_id = ?1)",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(counts)
        })
    }

    // -- Reactions --

    /// The reaction `user_id` holds on `tweet_id`, of any type.
    pub fn find_reaction(&self, tweet_id: i64, user_id: i64) -> Result<Option<ReactionRow>> {
        self.with_conn(|conn| query_reaction(conn, tweet_id, user_id))
    }

    /// Create a reaction and its join record. Returns `None` when the user
    /// already reacted to this tweet, whatever the type.
    pub fn add_reaction(&self, tweet_id: i64, user_id: i64, kind: &str) -> Result<Option<ReactionRow>> {
        self.with_tx(|tx| {
            if query_reaction(tx, tweet_id, user_id)?.is_some() {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO reactions (type, user_id) VALUES (?1, ?2)",
                rusqlite::params![kind, user_id],
            )?;
            let reaction_id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO tweet_reactions (tweet_id, reaction_id) VALUES (?1, ?2)",
                rusqlite::params![tweet_id, reaction_id],
            )?;

            query_reaction(tx, tweet_id, user_id)
        })
    }

    pub fn reactions_for_tweet(&self, tweet_id: i64) -> Result<Vec<ReactionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE tr.tweet_id = ?1 ORDER BY tr.id", REACTION_SELECT))?;
            let rows = stmt
                .query_map([tweet_id], map_reaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Remove the caller's reaction on a tweet: the join record, then the
    /// reaction itself, in one transaction. Returns false if there was none.
    pub fn remove_reaction(&self, tweet_id: i64, user_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let Some(existing) = query_reaction(tx, tweet_id, user_id)? else {
                return Ok(false);
            };
            tx.execute("DELETE FROM tweet_reactions WHERE id = ?1", [existing.link_id])?;
            tx.execute("DELETE FROM reactions WHERE id = ?1", [existing.reaction_id])?;
            Ok(true)
        })
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role_id: row.get(4)?,
        token: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_tweet(row: &Row<'_>) -> rusqlite::Result<TweetRow> {
    Ok(TweetRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        tweet: row.get(2)?,
        image: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        author_name: row.get(6)?,
        author_email: row.get(7)?,
    })
}

fn map_reaction(row: &Row<'_>) -> rusqlite::Result<ReactionRow> {
    Ok(ReactionRow {
        link_id: row.get(0)?,
        reaction_id: row.get(1)?,
        tweet_id: row.get(2)?,
        user_id: row.get(3)?,
        kind: row.get(4)?,
        user_name: row.get(5)?,
        user_email: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, filter: &str, param: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("{} {}", USER_SELECT, filter))?;
    let row = stmt.query_row([param], map_user).optional()?;
    Ok(row)
}

fn query_tweet(conn: &Connection, id: i64) -> Result<Option<TweetRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE t.id = ?1", TWEET_SELECT))?;
    let row = stmt.query_row([id], map_tweet).optional()?;
    Ok(row)
}

fn query_tweets<P: rusqlite::Params>(conn: &Connection, tail: &str, params: P) -> Result<Vec<TweetRow>> {
    let mut stmt = conn.prepare(&format!("{} {}", TWEET_SELECT, tail))?;
    let rows = stmt
        .query_map(params, map_tweet)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_follow(conn: &Connection, follower_id: i64, following_id: i64) -> Result<Option<FollowRow>> {
    let row = conn
        .query_row(
            "SELECT id, follower_id, following_id, created_at FROM follows
             WHERE follower_id = ?1 AND following_id = ?2",
            rusqlite::params![follower_id, following_id],
            |row| {
                Ok(FollowRow {
                    id: row.get(0)?,
                    follower_id: row.get(1)?,
                    following_id: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

fn query_follow_users(conn: &Connection, sql: &str, user_id: i64) -> Result<Vec<FollowUserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(FollowUserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_reaction(conn: &Connection, tweet_id: i64, user_id: i64) -> Result<Option<ReactionRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE tr.tweet_id = ?1 AND r.user_id = ?2",
        REACTION_SELECT
    ))?;
    let row = stmt
        .query_row(rusqlite::params![tweet_id, user_id], map_reaction)
        .optional()?;
    Ok(row)
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
