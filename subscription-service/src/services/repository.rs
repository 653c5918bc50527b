//! Subscription storage contract and its PostgreSQL implementation.

use crate::models::{CostFilter, MonthYear, Subscription, SubscriptionInput};
use crate::services::metrics::DB_QUERY_DURATION;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Storage operations for subscriptions.
///
/// Soft-deleted rows are invisible to every read. Lookups that miss return
/// `None`/`false` rather than an error so callers can tell "absent" apart from
/// a store failure.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, id: Uuid, input: &SubscriptionInput) -> Result<Subscription, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Subscription>, AppError>;

    /// Overwrite every mutable column of a live row.
    async fn update(
        &self,
        id: Uuid,
        input: &SubscriptionInput,
    ) -> Result<Option<Subscription>, AppError>;

    /// Mark a live row deleted. Returns `false` if no live row matched.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn list(&self) -> Result<Vec<Subscription>, AppError>;

    /// Sum of `price` over live rows overlapping `[start, end]`, 0 when none match.
    async fn total_cost(
        &self,
        filter: &CostFilter,
        start: MonthYear,
        end: MonthYear,
    ) -> Result<i64, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

const COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at, deleted_at";

/// The one place that decides which rows are visible.
const LIVE: &str = "deleted_at IS NULL";

/// PostgreSQL-backed repository.
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "subscription-service"))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    #[instrument(skip(self, input), fields(user_id = %input.user_id, service_name = %input.service_name))]
    async fn create(&self, id: Uuid, input: &SubscriptionInput) -> Result<Subscription, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_subscription"])
            .start_timer();

        let sql = format!(
            "INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let subscription = sqlx::query_as::<_, Subscription>(&sql)
            .bind(id)
            .bind(&input.service_name)
            .bind(input.price)
            .bind(input.user_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create subscription: {}", e))
            })?;

        timer.observe_duration();
        info!(subscription_id = %subscription.id, "Subscription created");

        Ok(subscription)
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Subscription>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_subscription"])
            .start_timer();

        let sql = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1 AND {LIVE}");
        let subscription = sqlx::query_as::<_, Subscription>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get subscription: {}", e))
            })?;

        timer.observe_duration();

        Ok(subscription)
    }

    #[instrument(skip(self, input), fields(subscription_id = %id))]
    async fn update(
        &self,
        id: Uuid,
        input: &SubscriptionInput,
    ) -> Result<Option<Subscription>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_subscription"])
            .start_timer();

        let sql = format!(
            "UPDATE subscriptions
             SET service_name = $2, price = $3, user_id = $4, start_date = $5, end_date = $6, updated_at = NOW()
             WHERE id = $1 AND {LIVE}
             RETURNING {COLUMNS}"
        );
        let subscription = sqlx::query_as::<_, Subscription>(&sql)
            .bind(id)
            .bind(&input.service_name)
            .bind(input.price)
            .bind(input.user_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to update subscription: {}", e))
            })?;

        timer.observe_duration();
        if subscription.is_some() {
            info!("Subscription updated");
        }

        Ok(subscription)
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_subscription"])
            .start_timer();

        let sql = format!(
            "UPDATE subscriptions SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND {LIVE}"
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete subscription: {}", e))
            })?;

        timer.observe_duration();
        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Subscription soft-deleted");
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Subscription>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_subscriptions"])
            .start_timer();

        let sql = format!("SELECT {COLUMNS} FROM subscriptions WHERE {LIVE} ORDER BY created_at, id");
        let subscriptions = sqlx::query_as::<_, Subscription>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to list subscriptions: {}", e))
            })?;

        timer.observe_duration();

        Ok(subscriptions)
    }

    #[instrument(skip(self, filter), fields(start = %start, end = %end))]
    async fn total_cost(
        &self,
        filter: &CostFilter,
        start: MonthYear,
        end: MonthYear,
    ) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["total_cost"])
            .start_timer();

        let sql = format!(
            "SELECT COALESCE(SUM(price), 0)::BIGINT
             FROM subscriptions
             WHERE {LIVE}
               AND start_date <= $2
               AND (end_date IS NULL OR end_date >= $1)
               AND ($3::uuid IS NULL OR user_id = $3)
               AND ($4::varchar IS NULL OR service_name = $4)"
        );
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(start)
            .bind(end)
            .bind(filter.user_id)
            .bind(filter.service_name.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to calculate total cost: {}", e))
            })?;

        timer.observe_duration();

        Ok(total)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }
}
