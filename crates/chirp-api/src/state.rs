use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use chirp_db::Database;
use chirp_types::api::Claims;
use chirp_types::models::Role;

use crate::error::{ApiError, ApiResult};
use crate::media::MediaStore;
use crate::middleware::authorize;
use crate::password::Passwords;
use crate::token::TokenCodec;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenCodec,
    pub passwords: Passwords,
    pub media: MediaStore,
    /// Mark session cookies `Secure` (production).
    pub secure_cookies: bool,
}

impl AppStateInner {
    /// Authorize the request's session against a role allow-list, mapping
    /// failures to 401/403.
    pub fn guard(&self, jar: &CookieJar, allowed: &[Role]) -> ApiResult<Claims> {
        Ok(authorize(jar, &self.tokens, allowed)?)
    }

    /// `guard`, plus a check that the caller's account still exists. A token
    /// stays valid until it expires even if its account has been deleted.
    pub fn guard_account(&self, jar: &CookieJar, allowed: &[Role]) -> ApiResult<Claims> {
        let claims = self.guard(jar, allowed)?;
        if self.db.get_user_by_id(claims.id)?.is_none() {
            warn!(user_id = claims.id, "Session token for a deleted account");
            return Err(ApiError::unauthorized("Account no longer exists"));
        }
        Ok(claims)
    }
}
