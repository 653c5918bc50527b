//! Services module for subscription-service.

pub mod memory;
pub mod metrics;
pub mod repository;
pub mod subscription;

pub use memory::InMemorySubscriptionRepository;
pub use metrics::{get_metrics, init_metrics, record_subscription_operation};
pub use repository::{PgSubscriptionRepository, SubscriptionRepository};
pub use subscription::SubscriptionService;
