use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::media::{MAX_IMAGE_SIZE, PUBLIC_PREFIX};
use crate::state::AppState;
use crate::{auth, follows, profile, reactions, tweets, users};

/// Room for the text fields and multipart framing around a maximum-size image.
const MAX_BODY_SIZE: usize = MAX_IMAGE_SIZE + 512 * 1024;

/// Every HTTP route, plus static serving of uploaded images.
pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.media.dir());

    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/register", post(auth::register))
        .route(
            "/profile/{id}",
            get(profile::get_profile)
                .patch(profile::update_profile)
                .delete(profile::delete_profile),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/follow/{id}",
            get(follows::list_follows)
                .post(follows::follow)
                .delete(follows::unfollow),
        )
        .route("/follow/{id}/count", get(follows::follow_count))
        .route("/tweets", get(tweets::list_tweets).post(tweets::create_tweet))
        .route("/tweets/feed", get(tweets::feed))
        .route("/tweets/user/{id}", get(tweets::user_tweets))
        .route(
            "/tweets/{id}",
            get(tweets::get_tweet)
                .patch(tweets::update_tweet)
                .delete(tweets::delete_tweet),
        )
        .route(
            "/tweets/{id}/reactions",
            get(reactions::list_reactions).delete(reactions::delete_reaction),
        )
        .route("/reaction", post(reactions::create_reaction))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}
