//! HTTP handlers for subscription-service.

pub mod cost;
pub mod subscriptions;

use axum::extract::{FromRequest, FromRequestParts};
use service_core::error::AppError;

/// `Json` whose rejections become `400 {"error": ...}` instead of axum's defaults.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections become `400 {"error": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
