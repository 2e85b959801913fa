//! axum extractors whose rejections come back as `ApiError`, so malformed
//! paths, queries and bodies get the same `{"message"}` shape as every other
//! failure.

use axum::{
    Json,
    extract::{Path, Query},
};
use axum_extra::extract::WithRejection;

use crate::error::ApiError;

/// JSON request body.
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Numeric `{id}` path segment.
pub type PathId = WithRejection<Path<i64>, ApiError>;

pub type QueryParams<T> = WithRejection<Query<T>, ApiError>;
