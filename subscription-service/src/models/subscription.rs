//! Subscription model.

use super::MonthYear;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A user's paid access to a service over a month range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    #[schema(example = "Netflix")]
    pub service_name: String,
    #[schema(example = 15, minimum = 0)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "01-2024")]
    pub start_date: MonthYear,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "12-2024")]
    pub end_date: Option<MonthYear>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Inclusive overlap with `[start, end]`; an open `end_date` never ends.
    pub fn is_active_between(&self, start: MonthYear, end: MonthYear) -> bool {
        self.start_date <= end && self.end_date.map_or(true, |until| until >= start)
    }

    pub fn matches(&self, filter: &CostFilter) -> bool {
        filter.user_id.map_or(true, |user_id| self.user_id == user_id)
            && filter
                .service_name
                .as_deref()
                .map_or(true, |name| self.service_name == name)
    }
}

/// Mutable fields of a subscription, used for both create and full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

/// Optional narrowing of a cost query. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> MonthYear {
        s.parse().unwrap()
    }

    fn subscription(start: &str, end: Option<&str>) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".to_string(),
            price: 15,
            user_id: Uuid::new_v4(),
            start_date: month(start),
            end_date: end.map(month),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn overlap_includes_touching_boundary() {
        let sub = subscription("03-2024", Some("05-2024"));
        assert!(sub.is_active_between(month("05-2024"), month("06-2024")));
        assert!(sub.is_active_between(month("01-2024"), month("03-2024")));
    }

    #[test]
    fn overlap_excludes_disjoint_ranges() {
        let sub = subscription("03-2024", Some("05-2024"));
        assert!(!sub.is_active_between(month("06-2024"), month("12-2024")));
        assert!(!sub.is_active_between(month("01-2023"), month("02-2024")));
    }

    #[test]
    fn open_ended_subscription_extends_forever() {
        let sub = subscription("01-2020", None);
        assert!(sub.is_active_between(month("01-2020"), month("01-2020")));
        assert!(sub.is_active_between(month("06-2999"), month("12-9999")));
        assert!(!sub.is_active_between(month("01-2019"), month("12-2019")));
    }

    #[test]
    fn filter_matches_only_supplied_fields() {
        let sub = subscription("01-2024", None);
        assert!(sub.matches(&CostFilter::default()));
        assert!(sub.matches(&CostFilter {
            user_id: Some(sub.user_id),
            service_name: Some("Netflix".to_string()),
        }));
        assert!(!sub.matches(&CostFilter {
            user_id: None,
            service_name: Some("Spotify".to_string()),
        }));
        assert!(!sub.matches(&CostFilter {
            user_id: Some(Uuid::new_v4()),
            service_name: None,
        }));
    }

    #[test]
    fn json_omits_absent_end_date_and_deletion_marker() {
        let mut sub = subscription("01-2024", None);
        sub.deleted_at = Some(Utc::now());
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["start_date"], "01-2024");
        assert!(json.get("end_date").is_none());
        assert!(json.get("deleted_at").is_none());
    }
}
