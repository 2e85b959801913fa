use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS roles (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role_id     INTEGER NOT NULL DEFAULT 3 REFERENCES roles(id),
            token       TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tweets (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            tweet       TEXT NOT NULL,
            image       TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_tweets_user
            ON tweets(user_id, created_at);

        CREATE TABLE IF NOT EXISTS follows (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            follower_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            following_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(follower_id, following_id),
            CHECK(follower_id <> following_id)
        );

        CREATE INDEX IF NOT EXISTS idx_follows_following
            ON follows(following_id);

        CREATE TABLE IF NOT EXISTS reactions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            type        TEXT NOT NULL CHECK(type IN ('LIKE', 'LOVE', 'FUNNY')),
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tweet_reactions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            tweet_id    INTEGER NOT NULL REFERENCES tweets(id) ON DELETE CASCADE,
            reaction_id INTEGER NOT NULL UNIQUE REFERENCES reactions(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_tweet_reactions_tweet
            ON tweet_reactions(tweet_id);

        -- Role rows are referenced by users.role_id
        INSERT OR IGNORE INTO roles (id, name) VALUES (1, 'Admin');
        INSERT OR IGNORE INTO roles (id, name) VALUES (2, 'Editor');
        INSERT OR IGNORE INTO roles (id, name) VALUES (3, 'Viewer');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
