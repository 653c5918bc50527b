//! Subscription CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::ApiJson;
use crate::models::{Subscription, SubscriptionInput};
use crate::services::subscription::parse_month_year;
use crate::startup::AppState;

/// Body for both create and full-replace update. Any `id` field is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscriptionRequest {
    #[validate(length(min = 1, message = "service_name must not be empty"))]
    #[schema(example = "Netflix")]
    pub service_name: String,
    #[validate(range(min = 0, message = "price must be non-negative"))]
    #[schema(example = 15, minimum = 0)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "01-2024")]
    pub start_date: String,
    #[schema(example = "12-2024")]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    fn into_input(self) -> Result<SubscriptionInput, AppError> {
        self.validate()?;

        let start_date = parse_month_year(&self.start_date, "start")?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|end| parse_month_year(end, "end"))
            .transpose()?;

        Ok(SubscriptionInput {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}

fn parse_subscription_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|e| {
        tracing::debug!(id = %raw, error = %e, "Invalid subscription id");
        AppError::BadRequest(anyhow::anyhow!("Invalid subscription ID"))
    })
}

/// Create a new subscription.
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = Subscription),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Store failure")
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state, request))]
pub async fn create_subscription(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubscriptionRequest>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let input = request.into_input()?;
    let subscription = state.service.create_subscription(input).await?;

    tracing::info!(subscription_id = %subscription.id, "Subscription created successfully");

    Ok((StatusCode::CREATED, Json(subscription)))
}

/// Get a subscription by ID.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Subscription not found")
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Subscription>, AppError> {
    let id = parse_subscription_id(&id)?;
    let subscription = state.service.get_subscription(id).await?;
    Ok(Json(subscription))
}

/// Replace a subscription's fields. The id comes from the path only.
#[utoipa::path(
    put,
    path = "/api/v1/subscriptions/{id}",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = Subscription),
        (status = 400, description = "Malformed ID or invalid input"),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Store failure")
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SubscriptionRequest>,
) -> Result<Json<Subscription>, AppError> {
    let id = parse_subscription_id(&id)?;
    let input = request.into_input()?;
    let subscription = state.service.update_subscription(id, input).await?;
    Ok(Json(subscription))
}

/// Soft-delete a subscription. Repeating the call still answers 204.
#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions/{id}",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Subscription deleted, or already absent"),
        (status = 400, description = "Malformed ID"),
        (status = 500, description = "Store failure")
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_subscription_id(&id)?;
    state.service.delete_subscription(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List every subscription that has not been deleted.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    responses(
        (status = 200, description = "All live subscriptions", body = [Subscription]),
        (status = 500, description = "Store failure")
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let subscriptions = state.service.list_subscriptions().await?;
    Ok(Json(subscriptions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: Option<&str>) -> SubscriptionRequest {
        SubscriptionRequest {
            service_name: "Netflix".to_string(),
            price: 15,
            user_id: Uuid::new_v4(),
            start_date: start.to_string(),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn into_input_parses_dates() {
        let input = request("01-2024", Some("12-2024")).into_input().unwrap();
        assert_eq!(input.start_date.to_string(), "01-2024");
        assert_eq!(input.end_date.unwrap().to_string(), "12-2024");
    }

    #[test]
    fn into_input_rejects_bad_end_date() {
        let err = request("01-2024", Some("2024-12")).into_input().unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid end date format. Use MM-YYYY");
    }

    #[test]
    fn into_input_rejects_negative_price_and_empty_name() {
        let mut negative = request("01-2024", None);
        negative.price = -1;
        assert!(matches!(negative.into_input(), Err(AppError::ValidationError(_))));

        let mut unnamed = request("01-2024", None);
        unnamed.service_name.clear();
        assert!(matches!(unnamed.into_input(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn subscription_id_must_be_uuid() {
        assert!(parse_subscription_id("not-a-uuid").is_err());
        assert!(parse_subscription_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
