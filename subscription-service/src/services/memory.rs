//! In-process subscription store used by tests.

use crate::models::{CostFilter, MonthYear, Subscription, SubscriptionInput};
use crate::services::SubscriptionRepository;
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Keeps soft-deleted rows around, exactly like the database table.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Subscription>>, AppError> {
        self.rows.lock().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Subscription store mutex poisoned: {}", e))
        })
    }

    /// Every stored row, including soft-deleted ones.
    pub fn raw_rows(&self) -> Result<Vec<Subscription>, AppError> {
        Ok(self.rows()?.values().cloned().collect())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, id: Uuid, input: &SubscriptionInput) -> Result<Subscription, AppError> {
        let mut rows = self.rows()?;
        if rows.contains_key(&id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "duplicate key value violates unique constraint on id {}",
                id
            )));
        }

        let now = Utc::now();
        let subscription = Subscription {
            id,
            service_name: input.service_name.clone(),
            price: input.price,
            user_id: input.user_id,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.insert(id, subscription.clone());

        Ok(subscription)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Subscription>, AppError> {
        Ok(self.rows()?.get(&id).filter(|s| !s.is_deleted()).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        input: &SubscriptionInput,
    ) -> Result<Option<Subscription>, AppError> {
        let mut rows = self.rows()?;
        let Some(row) = rows.get_mut(&id).filter(|s| !s.is_deleted()) else {
            return Ok(None);
        };

        row.service_name = input.service_name.clone();
        row.price = input.price;
        row.user_id = input.user_id;
        row.start_date = input.start_date;
        row.end_date = input.end_date;
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows()?;
        match rows.get_mut(&id).filter(|s| !s.is_deleted()) {
            Some(row) => {
                let now = Utc::now();
                row.deleted_at = Some(now);
                row.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<Subscription>, AppError> {
        let mut live: Vec<Subscription> = self
            .rows()?
            .values()
            .filter(|s| !s.is_deleted())
            .cloned()
            .collect();
        live.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(live)
    }

    async fn total_cost(
        &self,
        filter: &CostFilter,
        start: MonthYear,
        end: MonthYear,
    ) -> Result<i64, AppError> {
        Ok(self
            .rows()?
            .values()
            .filter(|s| !s.is_deleted() && s.is_active_between(start, end) && s.matches(filter))
            .map(|s| i64::from(s.price))
            .sum())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.rows().map(|_| ())
    }
}
