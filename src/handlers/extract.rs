//! Extractors whose rejections use the portal error body
//!
//! Drop-in replacements for axum's `Json`, `Path` and `Query`. A malformed
//! body, path segment or query string becomes `PortalError::InvalidInput`.

use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::errors::PortalError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(PortalError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PortalError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(PortalError))]
pub struct Query<T>(pub T);
