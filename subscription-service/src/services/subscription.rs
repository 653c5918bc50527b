//! Subscription orchestration between the HTTP layer and storage.

use crate::models::{CostFilter, MonthYear, Subscription, SubscriptionInput};
use crate::services::metrics::record_subscription_operation;
use crate::services::SubscriptionRepository;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn SubscriptionRepository> {
        &self.repo
    }

    /// Persist a new subscription under a freshly generated id.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_subscription(
        &self,
        input: SubscriptionInput,
    ) -> Result<Subscription, AppError> {
        let id = Uuid::new_v4();
        let result = self.repo.create(id, &input).await;
        record_subscription_operation("create", result.is_ok());
        result
    }

    #[instrument(skip(self))]
    pub async fn get_subscription(&self, id: Uuid) -> Result<Subscription, AppError> {
        let result = self
            .repo
            .get_by_id(id)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(id)));
        record_subscription_operation("get", result.is_ok());
        result
    }

    /// Replace every mutable field of an existing subscription.
    #[instrument(skip(self, input))]
    pub async fn update_subscription(
        &self,
        id: Uuid,
        input: SubscriptionInput,
    ) -> Result<Subscription, AppError> {
        let result = self
            .repo
            .update(id, &input)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(id)));
        record_subscription_operation("update", result.is_ok());
        result
    }

    /// Soft-delete. Deleting an unknown or already deleted id succeeds.
    #[instrument(skip(self))]
    pub async fn delete_subscription(&self, id: Uuid) -> Result<(), AppError> {
        let result = self.repo.soft_delete(id).await.map(|deleted| {
            if !deleted {
                debug!(subscription_id = %id, "Delete of missing subscription is a no-op");
            }
        });
        record_subscription_operation("delete", result.is_ok());
        result
    }

    #[instrument(skip(self))]
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        let result = self.repo.list().await;
        record_subscription_operation("list", result.is_ok());
        result
    }

    /// Total price of subscriptions active at any point in `[start, end]`.
    ///
    /// Both bounds are `MM-YYYY` strings; anything else is a bad request.
    #[instrument(skip(self, filter))]
    pub async fn calculate_total_cost(
        &self,
        filter: CostFilter,
        start: &str,
        end: &str,
    ) -> Result<i64, AppError> {
        let start_date = parse_month_year(start, "start")?;
        let end_date = parse_month_year(end, "end")?;

        let result = self.repo.total_cost(&filter, start_date, end_date).await;
        record_subscription_operation("total_cost", result.is_ok());

        let total = result?;
        info!(total_cost = total, "Total cost calculated");
        Ok(total)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Subscription not found: {}", id))
}

pub(crate) fn parse_month_year(value: &str, which: &str) -> Result<MonthYear, AppError> {
    value.parse().map_err(|_| {
        AppError::BadRequest(anyhow::anyhow!(
            "Invalid {} date format. Use {}",
            which,
            crate::models::MONTH_YEAR_FORMAT
        ))
    })
}
