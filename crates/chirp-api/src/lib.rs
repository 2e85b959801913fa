pub mod auth;
pub mod error;
pub mod extract;
pub mod follows;
pub mod media;
pub mod middleware;
pub mod password;
pub mod profile;
pub mod reactions;
pub mod routes;
pub mod state;
pub mod token;
pub mod tweets;
pub mod users;
pub mod views;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::{AppState, AppStateInner};
