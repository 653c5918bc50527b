//! Date-range cost aggregation handler.

use axum::{extract::State, Json};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use service_core::error::AppError;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::ApiQuery;
use crate::models::CostFilter;
use crate::startup::AppState;

/// Optional filters treat an empty value (`user_id=`, `service_name=`) as absent.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CostQuery {
    /// Only count this user's subscriptions
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<Uuid>,
    /// Only count subscriptions to this service
    #[serde(default, deserialize_with = "empty_as_none")]
    pub service_name: Option<String>,
    /// First month of the range (MM-YYYY)
    pub start_date: String,
    /// Last month of the range, inclusive (MM-YYYY)
    pub end_date: String,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CostResponse {
    #[schema(example = 15)]
    pub total_cost: i64,
}

/// Sum the price of every subscription active at some point in the range.
#[utoipa::path(
    get,
    path = "/api/v1/cost",
    params(CostQuery),
    responses(
        (status = 200, description = "Total cost for the range", body = CostResponse),
        (status = 400, description = "Missing or malformed parameters"),
        (status = 500, description = "Store failure")
    ),
    tag = "Cost"
)]
#[tracing::instrument(skip(state))]
pub async fn calculate_total_cost(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CostQuery>,
) -> Result<Json<CostResponse>, AppError> {
    let filter = CostFilter {
        user_id: query.user_id,
        service_name: query.service_name,
    };

    let total_cost = state
        .service
        .calculate_total_cost(filter, &query.start_date, &query.end_date)
        .await?;

    Ok(Json(CostResponse { total_cost }))
}
