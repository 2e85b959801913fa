//! End-to-end tests: the full router against an in-memory database and a
//! temporary upload directory.

use std::sync::Arc;

use argon2::Params;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use chirp_api::media::MediaStore;
use chirp_api::password::Passwords;
use chirp_api::token::TokenCodec;
use chirp_api::{AppState, AppStateInner, router};
use chirp_db::Database;

const BOUNDARY: &str = "chirp-test-boundary";

struct Harness {
    app: Router,
    state: AppState,
    _uploads: TempDir,
}

/// A logged-in user: their id and session token.
struct Session {
    id: i64,
    token: String,
}

impl Harness {
    async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            tokens: TokenCodec::new("integration-secret"),
            passwords: Passwords::with_params(Params::new(1024, 1, 1, None).unwrap()),
            media: MediaStore::new(uploads.path().to_path_buf()).await.unwrap(),
            secure_cookies: false,
        });
        Self {
            app: router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("jwtToken={}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("jwtToken={}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn multipart(&self, method: Method, uri: &str, token: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("jwtToken={}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn register(&self, name: &str, role_id: Option<i64>) -> Session {
        let mut body = json!({
            "name": name,
            "email": format!("{}@example.com", name),
            "password": "secret1",
            "confirm_password": "secret1",
        });
        if let Some(role_id) = role_id {
            body["role_id"] = json!(role_id);
        }
        let (status, body) = self.json(Method::POST, "/register", None, body).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        Session {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Admins cannot self-register, so they are seeded straight into the store.
    async fn admin(&self) -> Session {
        let hash = self.state.passwords.hash("secret1").unwrap();
        self.state
            .db
            .create_user("root", "root@example.com", &hash, 1)
            .unwrap();
        let (status, body) = self.login("root@example.com", "secret1").await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();
        let id = self.state.tokens.verify(&token).unwrap().id;
        Session { id, token }
    }

    async fn tweet(&self, session: &Session, text: &str) -> i64 {
        let (status, body) = self
            .multipart(Method::POST, "/tweets", &session.token, form(&[("tweet", text)], None))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["tweet"]["id"].as_i64().unwrap()
    }
}

/// A multipart body with text fields and an optional `(file name, content type, bytes)` image.
fn form(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

// -- Auth --

#[tokio::test]
async fn login_token_carries_role() {
    let h = Harness::new().await;
    h.register("ed", Some(2)).await;

    let (status, body) = h.login("ed@example.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    let claims = h.state.tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.role_id, 2);
    assert_eq!(claims.email, "ed@example.com");
}

#[tokio::test]
async fn login_failures() {
    let h = Harness::new().await;
    h.register("vic", None).await;

    let (status, _) = h.login("nobody@example.com", "secret1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h.login("vic@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid password");

    let (status, _) = h.json(Method::POST, "/login", None, json!({ "email": "vic@example.com" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn registration_never_grants_admin() {
    let h = Harness::new().await;
    let session = h.register("sneaky", Some(1)).await;

    let claims = h.state.tokens.verify(&session.token).unwrap();
    assert_eq!(claims.role_id, 3);
}

#[tokio::test]
async fn registration_validation() {
    let h = Harness::new().await;
    h.register("dup", None).await;

    let (status, _) = h
        .json(
            Method::POST,
            "/register",
            None,
            json!({
                "name": "dup",
                "email": "dup@example.com",
                "password": "secret1",
                "confirm_password": "secret1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = h
        .json(
            Method::POST,
            "/register",
            None,
            json!({
                "name": "mismatch",
                "email": "mismatch@example.com",
                "password": "secret1",
                "confirm_password": "secret2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn logout_requires_session() {
    let h = Harness::new().await;
    let session = h.register("leaver", None).await;

    let (status, _) = h.call(Method::GET, "/logout", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.call(Method::GET, "/logout", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h.call(Method::GET, "/logout", Some(&session.token)).await;
    assert_eq!(status, StatusCode::OK);
    let stored = h.state.db.get_user_by_id(session.id).unwrap().unwrap();
    assert!(stored.token.is_none());
}

// -- Access control --

#[tokio::test]
async fn role_allow_lists() {
    let h = Harness::new().await;
    let viewer = h.register("viewer", None).await;
    let editor = h.register("editor", Some(2)).await;
    let admin = h.admin().await;

    let (status, _) = h.call(Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.call(Method::GET, "/users", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.call(Method::GET, "/users", Some(&viewer.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.call(Method::GET, "/users", Some(&editor.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = h.call(Method::GET, "/users", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);

    let (status, _) = h
        .multipart(Method::POST, "/tweets", &viewer.token, form(&[("tweet", "hi")], None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    h.tweet(&editor, "hello").await;
    h.tweet(&admin, "hello from root").await;
}

#[tokio::test]
async fn profile_is_self_only() {
    let h = Harness::new().await;
    let alice = h.register("alice", None).await;
    let bob = h.register("bob", None).await;

    let (status, body) = h
        .call(Method::GET, &format!("/profile/{}", alice.id), Some(&alice.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password").is_none());

    let (status, _) = h
        .call(Method::GET, &format!("/profile/{}", alice.id), Some(&bob.token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h
        .call(Method::DELETE, &format!("/profile/{}", alice.id), Some(&bob.token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn password_change_needs_old_password() {
    let h = Harness::new().await;
    let user = h.register("pat", None).await;
    let uri = format!("/profile/{}", user.id);

    let (status, _) = h
        .json(
            Method::PATCH,
            &uri,
            Some(&user.token),
            json!({ "old_password": "wrong1", "new_password": "fresh123", "confirm_password": "fresh123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h
        .json(
            Method::PATCH,
            &uri,
            Some(&user.token),
            json!({ "new_password": "fresh123", "confirm_password": "fresh123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .json(
            Method::PATCH,
            &uri,
            Some(&user.token),
            json!({ "old_password": "secret1", "new_password": "fresh123", "confirm_password": "fresh123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.login("pat@example.com", "secret1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.login("pat@example.com", "fresh123").await;
    assert_eq!(status, StatusCode::OK);
}

// -- Admin user management --

#[tokio::test]
async fn admin_manages_users() {
    let h = Harness::new().await;
    let admin = h.admin().await;

    let (status, body) = h
        .json(
            Method::POST,
            "/users",
            Some(&admin.token),
            json!({
                "name": "made",
                "email": "made@example.com",
                "password": "secret1",
                "confirm_password": "secret1",
                "role_id": 2,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["user"]["id"].as_i64().unwrap();

    let (status, _) = h
        .json(
            Method::POST,
            "/users",
            Some(&admin.token),
            json!({ "name": "norole", "email": "norole@example.com", "password": "secret1", "confirm_password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .json(Method::PATCH, &format!("/users/{}", id), Some(&admin.token), json!({ "role_id": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role_id"], 3);

    let (status, body) = h.call(Method::GET, &format!("/users/{}", id), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_count"]["tweets"], 0);

    let (status, _) = h.call(Method::DELETE, &format!("/users/{}", id), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call(Method::GET, &format!("/users/{}", id), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Follows --

#[tokio::test]
async fn follow_rules() {
    let h = Harness::new().await;
    let alice = h.register("alice", None).await;
    let bob = h.register("bob", None).await;
    let bob_uri = format!("/follow/{}", bob.id);

    let (status, _) = h
        .call(Method::POST, &format!("/follow/{}", alice.id), Some(&alice.token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.call(Method::POST, &bob_uri, Some(&alice.token)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = h.call(Method::POST, &bob_uri, Some(&alice.token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = h.call(Method::POST, "/follow/9999", Some(&alice.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h.call(Method::GET, &format!("{}/count", bob_uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followersCount"], 1);
    assert_eq!(body["followingsCount"], 0);

    let (status, body) = h.call(Method::GET, &bob_uri, Some(&bob.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followers"][0]["name"], "alice");

    let (status, _) = h.call(Method::DELETE, &bob_uri, Some(&alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call(Method::DELETE, &bob_uri, Some(&alice.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Tweets --

#[tokio::test]
async fn tweet_ownership() {
    let h = Harness::new().await;
    let owner = h.register("owner", Some(2)).await;
    let other = h.register("other", Some(2)).await;
    let viewer = h.register("viewer", None).await;
    let admin = h.admin().await;

    let id = h.tweet(&owner, "original").await;
    let uri = format!("/tweets/{}", id);
    let edit = || form(&[("new_tweet", "edited")], None);

    for session in [&other, &admin] {
        let (status, _) = h.multipart(Method::PATCH, &uri, &session.token, edit()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, _) = h.multipart(Method::PATCH, &uri, &viewer.token, edit()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h.multipart(Method::PATCH, &uri, &owner.token, edit()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tweet"]["tweet"], "edited");

    for session in [&other, &viewer] {
        let (status, _) = h.call(Method::DELETE, &uri, Some(&session.token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = h.call(Method::DELETE, &uri, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call(Method::GET, &uri, Some(&owner.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Owners of every tweeting role edit and delete their own tweets.
    for session in [&owner, &admin] {
        let own = format!("/tweets/{}", h.tweet(session, "mine").await);
        let (status, _) = h.multipart(Method::PATCH, &own, &session.token, edit()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = h.call(Method::DELETE, &own, Some(&session.token)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = h.call(Method::GET, &own, Some(&session.token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn tweet_validation() {
    let h = Harness::new().await;
    let editor = h.register("editor", Some(2)).await;

    let (status, _) = h
        .multipart(Method::POST, "/tweets", &editor.token, form(&[("tweet", "   ")], None))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = h
        .json(Method::POST, "/tweets", Some(&editor.token), json!({ "tweet": "json" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = h.tweet(&editor, "same").await;
    let (status, _) = h
        .multipart(
            Method::PATCH,
            &format!("/tweets/{}", id),
            &editor.token,
            form(&[("new_tweet", "same")], None),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tweet_with_image() {
    let h = Harness::new().await;
    let editor = h.register("painter", Some(2)).await;
    let png: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

    let (status, body) = h
        .multipart(
            Method::POST,
            "/tweets",
            &editor.token,
            form(&[("tweet", "look")], Some(("pic.png", "image/png", png))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let image = body["tweet"]["image"].as_str().unwrap().to_string();
    assert!(image.starts_with("/uploads/images/"));
    assert!(image.ends_with("pic.png"));

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri(&image).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&served[..], png);

    let (status, _) = h
        .multipart(
            Method::POST,
            "/tweets",
            &editor.token,
            form(&[("tweet", "gif")], Some(("anim.gif", "image/gif", &b"GIF89a"[..]))),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_and_user_tweets() {
    let h = Harness::new().await;
    let editor = h.register("writer", Some(2)).await;
    h.tweet(&editor, "Rust is fun").await;
    h.tweet(&editor, "Coffee time").await;

    let (status, body) = h.call(Method::GET, "/tweets?search=rust", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["user"]["name"], "writer");

    let (status, body) = h.call(Method::GET, "/tweets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["tweet"], "Coffee time");

    let (status, body) = h
        .call(Method::GET, &format!("/tweets/user/{}", editor.id), Some(&editor.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tweets"].as_array().unwrap().len(), 2);
}

// -- Feed and reactions --

#[tokio::test]
async fn feed_and_reactions() {
    let h = Harness::new().await;
    let editor = h.register("author", Some(2)).await;
    let reader = h.register("reader", None).await;

    let (status, body) = h.call(Method::GET, "/tweets/feed", Some(&reader.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tweets"].as_array().unwrap().is_empty());
    assert!(body["message"].is_string());

    let id = h.tweet(&editor, "follow me").await;
    let (status, _) = h
        .call(Method::POST, &format!("/follow/{}", editor.id), Some(&reader.token))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let react = |kind: &str| json!({ "tweet_id": id, "type": kind });
    let (status, body) = h.json(Method::POST, "/reaction", Some(&reader.token), react("LIKE")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reaction"]["type"], "LIKE");

    let (status, _) = h.json(Method::POST, "/reaction", Some(&reader.token), react("LOVE")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = h.json(Method::POST, "/reaction", Some(&editor.token), react("ANGRY")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h.call(Method::GET, "/tweets/feed", Some(&reader.token)).await;
    assert_eq!(status, StatusCode::OK);
    let tweets = body["tweets"].as_array().unwrap();
    assert_eq!(tweets.len(), 1);
    assert_eq!(tweets[0]["reactions"], json!(["LIKE"]));
    assert_eq!(tweets[0]["user"]["email"], "author@example.com");

    let reactions_uri = format!("/tweets/{}/reactions", id);
    let (status, body) = h.call(Method::GET, &reactions_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["reactionType"], "LIKE");
    assert_eq!(body["data"][0]["user"]["name"], "reader");

    let (status, _) = h.call(Method::DELETE, &reactions_uri, Some(&reader.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call(Method::DELETE, &reactions_uri, Some(&reader.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The slot is free again.
    let (status, _) = h.json(Method::POST, "/reaction", Some(&reader.token), react("FUNNY")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn deleting_account_cascades() {
    let h = Harness::new().await;
    let editor = h.register("gone", Some(2)).await;
    let fan = h.register("fan", None).await;
    let id = h.tweet(&editor, "soon gone").await;
    h.call(Method::POST, &format!("/follow/{}", editor.id), Some(&fan.token))
        .await;
    h.json(Method::POST, "/reaction", Some(&fan.token), json!({ "tweet_id": id, "type": "LOVE" }))
        .await;

    let (status, _) = h
        .call(Method::DELETE, &format!("/profile/{}", editor.id), Some(&editor.token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.call(Method::GET, &format!("/tweets/{}", id), Some(&fan.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = h.call(Method::GET, &format!("/follow/{}/count", fan.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followingsCount"], 0);
}

#[tokio::test]
async fn deleted_account_token_is_unauthorized() {
    let h = Harness::new().await;
    let gone = h.register("ghost", Some(2)).await;
    let other = h.register("other", Some(2)).await;
    let tweet_id = h.tweet(&other, "still here").await;

    let (status, _) = h
        .call(Method::DELETE, &format!("/profile/{}", gone.id), Some(&gone.token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h
        .multipart(Method::POST, "/tweets", &gone.token, form(&[("tweet", "boo")], None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account no longer exists");

    let (status, _) = h
        .call(Method::POST, &format!("/follow/{}", other.id), Some(&gone.token))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h
        .json(
            Method::POST,
            "/reaction",
            Some(&gone.token),
            json!({ "tweet_id": tweet_id, "type": "LIKE" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Malformed requests --

#[tokio::test]
async fn malformed_input_gets_json_errors() {
    let h = Harness::new().await;
    let user = h.register("parser", None).await;

    let no_content_type = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .body(Body::from(r#"{"email":"parser@example.com","password":"secret1"}"#))
        .unwrap();
    let (status, body) = h.send(no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let broken = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{bad"))
        .unwrap();
    let (status, body) = h.send(broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = h.json(Method::POST, "/login", None, json!({ "email": 5 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());

    for uri in ["/tweets/abc", "/follow/abc/count", "/profile/1.5"] {
        let (status, body) = h.call(Method::GET, uri, Some(&user.token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["message"].is_string(), "{}", uri);
    }
}
