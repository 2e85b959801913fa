//! Session cookie handling and the role-based access guard.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};

use chirp_types::api::Claims;
use chirp_types::models::Role;

use crate::token::{TOKEN_TTL_HOURS, TokenCodec};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwtToken";

/// Role allow-lists used by the routes.
pub mod roles {
    use chirp_types::models::Role;

    pub const ANY: &[Role] = &[Role::Admin, Role::Editor, Role::Viewer];
    pub const AUTHORS: &[Role] = &[Role::Admin, Role::Editor];
    pub const ADMIN: &[Role] = &[Role::Admin];
}

/// Why a request was not authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No session cookie on the request.
    MissingCredential,
    /// Cookie present but the token is malformed, expired or badly signed.
    InvalidCredential,
    /// Valid token whose role is not in the allow-list.
    RoleDenied,
}

/// Check the caller's session against `allowed`.
pub fn authorize(
    jar: &CookieJar,
    codec: &TokenCodec,
    allowed: &[Role],
) -> Result<Claims, AuthFailure> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        debug!("No session cookie on request");
        return Err(AuthFailure::MissingCredential);
    };

    let Some(claims) = codec.verify(cookie.value()) else {
        warn!("Invalid or expired session token");
        return Err(AuthFailure::InvalidCredential);
    };

    match claims.role() {
        Some(role) if allowed.contains(&role) => Ok(claims),
        role => {
            warn!(
                user_id = claims.id,
                role_id = claims.role_id,
                ?role,
                ?allowed,
                "Role not authorized"
            );
            Err(AuthFailure::RoleDenied)
        }
    }
}

/// Cookie that installs a freshly issued session token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::hours(TOKEN_TTL_HOURS))
        .build()
}

/// Cookie that expires the session on the client.
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}
