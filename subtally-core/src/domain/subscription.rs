//! Subscription domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::month::Month;
use super::result::{Error, Result};

/// A recurring charge billed once per calendar month
///
/// `end_month` is inclusive; `None` means the subscription is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    /// Monthly price in the smallest currency unit
    pub price: i64,
    pub user_id: Uuid,
    pub start_month: Month,
    pub end_month: Option<Month>,
}

impl Subscription {
    /// Build the stored record for a freshly created subscription
    pub fn from_input(id: Uuid, input: &CreateInput) -> Self {
        Self {
            id,
            service_name: input.service_name.clone(),
            price: input.price,
            user_id: input.user_id,
            start_month: input.start_month,
            end_month: input.end_month,
        }
    }

    /// Replace every mutable field; id and user_id stay as they are
    pub fn apply_update(&mut self, input: &UpdateInput) {
        self.service_name = input.service_name.clone();
        self.price = input.price;
        self.start_month = input.start_month;
        self.end_month = input.end_month;
    }

    /// Whether the active interval shares at least one month with `[from, to]`
    pub fn is_active_during(&self, from: Month, to: Month) -> bool {
        self.start_month <= to && self.end_month.map_or(true, |end| end >= from)
    }
}

/// Fields required to create a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInput {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_month: Month,
    pub end_month: Option<Month>,
}

impl CreateInput {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.service_name, self.price, self.start_month, self.end_month)
    }
}

/// Full replacement of a subscription's mutable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInput {
    pub service_name: String,
    pub price: i64,
    pub start_month: Month,
    pub end_month: Option<Month>,
}

impl UpdateInput {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.service_name, self.price, self.start_month, self.end_month)
    }
}

fn validate_fields(
    service_name: &str,
    price: i64,
    start_month: Month,
    end_month: Option<Month>,
) -> Result<()> {
    if service_name.trim().is_empty() {
        return Err(Error::validation("service name cannot be empty"));
    }
    if price < 0 {
        return Err(Error::validation(format!("price cannot be negative: {}", price)));
    }
    if let Some(end) = end_month {
        if end < start_month {
            return Err(Error::validation(format!(
                "end month {} is before start month {}",
                end, start_month
            )));
        }
    }
    Ok(())
}

/// Query parameters for listing subscriptions
///
/// The active-period overlap filter only applies when both bounds are set.
/// A `limit` of zero means no limit, the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub start_month_from: Option<Month>,
    pub start_month_to: Option<Month>,
    pub active_period_from: Option<Month>,
    pub active_period_to: Option<Month>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ListFilter {
    /// Whether a subscription passes every predicate of this filter
    ///
    /// Pagination is not part of matching; it applies after ordering.
    pub fn matches(&self, sub: &Subscription) -> bool {
        if self.user_id.is_some_and(|id| id != sub.user_id) {
            return false;
        }
        if self
            .service_name
            .as_deref()
            .is_some_and(|name| name != sub.service_name)
        {
            return false;
        }
        if self.start_month_from.is_some_and(|from| sub.start_month < from) {
            return false;
        }
        if self.start_month_to.is_some_and(|to| sub.start_month > to) {
            return false;
        }
        if let Some((from, to)) = self.active_period() {
            if !sub.is_active_during(from, to) {
                return false;
            }
        }
        true
    }

    /// Both overlap bounds, if the overlap filter is in effect
    pub fn active_period(&self) -> Option<(Month, Month)> {
        self.active_period_from.zip(self.active_period_to)
    }

    /// Page size to apply, `None` when every row after `offset` is wanted
    pub fn page_limit(&self) -> Option<usize> {
        self.limit.filter(|limit| *limit > 0)
    }
}

/// Parameters for computing total spend over a window of months
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub period_start: Month,
    pub period_end: Month,
}

impl SummaryFilter {
    pub fn new(period_start: Month, period_end: Month) -> Self {
        Self {
            user_id: None,
            service_name: None,
            period_start,
            period_end,
        }
    }

    /// Candidate query for the summation: same owner/service, active during the window
    pub fn to_list_filter(&self) -> ListFilter {
        ListFilter {
            user_id: self.user_id,
            service_name: self.service_name.clone(),
            active_period_from: Some(self.period_start),
            active_period_to: Some(self.period_end),
            ..ListFilter::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn create_input() -> CreateInput {
        CreateInput {
            service_name: "Yandex Plus".to_string(),
            price: 400,
            user_id: Uuid::new_v4(),
            start_month: month(2023, 1),
            end_month: Some(month(2023, 6)),
        }
    }

    #[test]
    fn test_create_input_validation() {
        assert!(create_input().validate().is_ok());

        let mut input = create_input();
        input.price = -1;
        assert!(matches!(input.validate(), Err(Error::Validation(_))));

        let mut input = create_input();
        input.end_month = Some(month(2022, 12));
        assert!(matches!(input.validate(), Err(Error::Validation(_))));

        let mut input = create_input();
        input.service_name = "   ".to_string();
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_same_start_and_end_month_is_valid() {
        let mut input = create_input();
        input.end_month = Some(input.start_month);
        input.price = 0;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_apply_update_keeps_identity() {
        let input = create_input();
        let id = Uuid::new_v4();
        let mut sub = Subscription::from_input(id, &input);

        sub.apply_update(&UpdateInput {
            service_name: "Netflix".to_string(),
            price: 999,
            start_month: month(2024, 2),
            end_month: None,
        });

        assert_eq!(sub.id, id);
        assert_eq!(sub.user_id, input.user_id);
        assert_eq!(sub.service_name, "Netflix");
        assert_eq!(sub.price, 999);
        assert_eq!(sub.start_month, month(2024, 2));
        assert_eq!(sub.end_month, None);
    }

    #[test]
    fn test_overlap_filter() {
        let sub = Subscription::from_input(Uuid::new_v4(), &create_input());

        let mut filter = ListFilter {
            active_period_from: Some(month(2023, 5)),
            active_period_to: Some(month(2023, 12)),
            ..ListFilter::default()
        };
        assert!(filter.matches(&sub));

        filter.active_period_from = Some(month(2023, 7));
        assert!(!filter.matches(&sub));
    }

    #[test]
    fn test_overlap_filter_needs_both_bounds() {
        let sub = Subscription::from_input(Uuid::new_v4(), &create_input());
        let filter = ListFilter {
            active_period_from: Some(month(2030, 1)),
            ..ListFilter::default()
        };
        assert!(filter.matches(&sub));
    }

    #[test]
    fn test_open_ended_subscription_overlaps_any_later_window() {
        let mut input = create_input();
        input.end_month = None;
        let sub = Subscription::from_input(Uuid::new_v4(), &input);

        assert!(sub.is_active_during(month(2040, 1), month(2040, 12)));
        assert!(!sub.is_active_during(month(2022, 1), month(2022, 12)));
    }

    #[test]
    fn test_exact_match_filters() {
        let input = create_input();
        let sub = Subscription::from_input(Uuid::new_v4(), &input);

        let by_user = ListFilter {
            user_id: Some(input.user_id),
            ..ListFilter::default()
        };
        assert!(by_user.matches(&sub));

        let other_user = ListFilter {
            user_id: Some(Uuid::new_v4()),
            ..ListFilter::default()
        };
        assert!(!other_user.matches(&sub));

        let wrong_case = ListFilter {
            service_name: Some("yandex plus".to_string()),
            ..ListFilter::default()
        };
        assert!(!wrong_case.matches(&sub));
    }

    #[test]
    fn test_start_month_range_is_inclusive() {
        let sub = Subscription::from_input(Uuid::new_v4(), &create_input());
        let filter = ListFilter {
            start_month_from: Some(month(2023, 1)),
            start_month_to: Some(month(2023, 1)),
            ..ListFilter::default()
        };
        assert!(filter.matches(&sub));

        let after = ListFilter {
            start_month_from: Some(month(2023, 2)),
            ..ListFilter::default()
        };
        assert!(!after.matches(&sub));
    }

    #[test]
    fn test_summary_filter_to_list_filter() {
        let user_id = Uuid::new_v4();
        let summary = SummaryFilter {
            user_id: Some(user_id),
            service_name: Some("Spotify".to_string()),
            period_start: month(2023, 1),
            period_end: month(2023, 12),
        };

        let list = summary.to_list_filter();
        assert_eq!(list.user_id, Some(user_id));
        assert_eq!(list.service_name.as_deref(), Some("Spotify"));
        assert_eq!(list.active_period(), Some((month(2023, 1), month(2023, 12))));
        assert_eq!(list.limit, None);
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn test_zero_page_limit_is_unlimited() {
        let mut filter = ListFilter::default();
        assert_eq!(filter.page_limit(), None);
        filter.limit = Some(0);
        assert_eq!(filter.page_limit(), None);
        filter.limit = Some(25);
        assert_eq!(filter.page_limit(), Some(25));
    }
}
