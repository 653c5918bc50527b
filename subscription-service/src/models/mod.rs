//! Domain models for subscription-service.

pub mod month_year;
pub mod subscription;

pub use month_year::{MonthYear, ParseMonthYearError, MONTH_YEAR_FORMAT};
pub use subscription::{CostFilter, Subscription, SubscriptionInput};
