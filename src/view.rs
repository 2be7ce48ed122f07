use crate::errors::DataError;
use crate::models::{Aggregation, AggregationRequest, Granularity, CATEGORIES};
use serde::Serialize;
use std::collections::BTreeSet;

/// What the analytics panel is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsView {
    pub granularity: Granularity,
    pub offset: u32,
    pub selected: BTreeSet<String>,
}

impl Default for AnalyticsView {
    fn default() -> Self {
        Self {
            granularity: Granularity::Daily,
            offset: 0,
            selected: CATEGORIES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl AnalyticsView {
    /// Switching resolution always returns to the most recent window.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.offset = 0;
    }

    pub fn previous_page(&mut self) {
        self.offset = self.offset.saturating_add(1);
    }

    pub fn next_page(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    /// Returns whether the category is selected afterwards.
    pub fn toggle_category(&mut self, category: &str) -> Result<bool, DataError> {
        if !CATEGORIES.contains(&category) {
            return Err(DataError::UnknownCategory(category.to_string()));
        }
        if self.selected.remove(category) {
            Ok(false)
        } else {
            self.selected.insert(category.to_string());
            Ok(true)
        }
    }

    pub fn request(&self) -> AggregationRequest {
        AggregationRequest {
            granularity: self.granularity,
            offset: self.offset,
        }
    }

    /// Drops unselected series. Labels, day counts and page flags are untouched.
    pub fn series(&self, mut aggregation: Aggregation) -> Aggregation {
        for point in &mut aggregation.points {
            point.values.retain(|name, _| self.selected.contains(name));
        }
        aggregation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregatedPoint, CategoryRanges, DailyRecord, Dataset};
    use crate::stats::aggregate_at;
    use chrono::{Duration, NaiveDate};

    fn dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let records = (0..30)
            .map(|i| DailyRecord {
                date: start + Duration::days(i),
                score: 50,
                categories: [("SS1".to_string(), 5), ("Rest".to_string(), 10)].into(),
            })
            .collect();
        Dataset::new(records).unwrap()
    }

    #[test]
    fn granularity_change_resets_offset() {
        let mut view = AnalyticsView::default();
        view.previous_page();
        view.previous_page();
        assert_eq!(view.request().offset, 2);

        view.set_granularity(Granularity::Weekly);
        assert_eq!(
            view.request(),
            AggregationRequest {
                granularity: Granularity::Weekly,
                offset: 0
            }
        );

        view.previous_page();
        view.set_granularity(Granularity::Weekly);
        assert_eq!(view.offset, 0);
    }

    #[test]
    fn next_page_stops_at_most_recent() {
        let mut view = AnalyticsView::default();
        view.next_page();
        assert_eq!(view.offset, 0);
        view.previous_page();
        view.next_page();
        assert_eq!(view.offset, 0);
    }

    #[test]
    fn toggle_category_flips_selection() {
        let mut view = AnalyticsView::default();
        assert!(!view.toggle_category("SS1").unwrap());
        assert!(!view.selected.contains("SS1"));
        assert!(view.toggle_category("SS1").unwrap());
        assert!(view.toggle_category("Yoga").is_err());
        assert_eq!(view.selected.len(), CATEGORIES.len());
    }

    #[test]
    fn selection_filters_series_without_changing_aggregation() {
        let ranges = CategoryRanges::default();
        let dataset = dataset();
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

        let mut view = AnalyticsView::default();
        view.set_granularity(Granularity::Weekly);
        let full = aggregate_at(today, &dataset, view.request(), &ranges).unwrap();

        view.toggle_category("Score").unwrap();
        view.toggle_category("Rest").unwrap();
        let again = aggregate_at(today, &dataset, view.request(), &ranges).unwrap();
        assert_eq!(full, again);

        let shown = view.series(again);
        assert_eq!(shown.points.len(), full.points.len());
        let first: &AggregatedPoint = &shown.points[0];
        assert!(!first.values.contains_key("Score"));
        assert!(!first.values.contains_key("Rest"));
        assert_eq!(first.values["SS1"], 33);
        assert_eq!(first.days_in_bucket, full.points[0].days_in_bucket);
    }
}
