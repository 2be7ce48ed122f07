use crate::errors::{ConfigError, DataError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCORE: &str = "Score";
pub const STUDY: &str = "Study";
pub const STUDY_PARTS: [&str; 3] = ["SS1", "SS2", "SS3"];

/// Series the analytics view can show, in display order.
pub const CATEGORIES: [&str; 8] = [SCORE, STUDY, "SS1", "SS2", "SS3", "Health", "Routine", "Rest"];

const DATE_FORMAT: &str = "%d-%m-%Y";

/// Parses the feed's `DD-MM-YYYY` dates. Two-digit day and month are required.
pub fn parse_feed_date(raw: &str) -> Result<NaiveDate, DataError> {
    let malformed = || DataError::MalformedDate(raw.to_string());
    let mut parts = raw.split('-');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(day, 2) || !digits(month, 2) || !digits(year, 4) {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| malformed())
}

pub fn format_feed_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// One row of the source feed, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Score")]
    pub score: i64,
    #[serde(rename = "Categories", default)]
    pub categories: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub score: i64,
    pub categories: BTreeMap<String, i64>,
}

impl DailyRecord {
    pub fn category(&self, name: &str) -> i64 {
        self.categories.get(name).copied().unwrap_or(0)
    }

    pub fn study(&self) -> i64 {
        STUDY_PARTS
            .iter()
            .fold(0i64, |total, part| total.saturating_add(self.category(part)))
    }
}

impl TryFrom<FeedRecord> for DailyRecord {
    type Error = DataError;

    fn try_from(raw: FeedRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_feed_date(&raw.date)?,
            score: raw.score,
            categories: raw.categories,
        })
    }
}

/// Daily records in strictly ascending date order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<DailyRecord>,
}

impl Dataset {
    pub fn new(records: Vec<DailyRecord>) -> Result<Self, DataError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(DataError::OutOfOrder {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { records })
    }

    pub fn from_feed(feed: Vec<FeedRecord>) -> Result<Self, DataError> {
        let records = feed
            .into_iter()
            .map(DailyRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(records)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, DataError> {
        let feed: Vec<FeedRecord> = serde_json::from_slice(bytes)?;
        Self::from_feed(feed)
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records
            .binary_search_by_key(&date, |record| record.date)
            .ok()
            .map(|index| &self.records[index])
    }
}

/// Maximum attainable raw value per day for each category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRanges {
    max: BTreeMap<String, i64>,
}

impl Default for CategoryRanges {
    fn default() -> Self {
        let max = [
            (SCORE, 100),
            (STUDY, 45),
            ("SS1", 15),
            ("SS2", 15),
            ("SS3", 15),
            ("Health", 15),
            ("Routine", 25),
            ("Rest", 15),
        ]
        .into_iter()
        .map(|(name, max)| (name.to_string(), max))
        .collect();
        Self { max }
    }
}

impl CategoryRanges {
    pub fn new(max: BTreeMap<String, i64>) -> Result<Self, ConfigError> {
        if let Some((name, _)) = max.iter().find(|(_, value)| **value <= 0) {
            return Err(ConfigError::NonPositiveMax(name.clone()));
        }
        Ok(Self { max })
    }

    pub fn max(&self, category: &str) -> Option<i64> {
        self.max.get(category).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.max.keys().map(String::as_str)
    }

    /// Every category the dataset carries must be normalizable.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), ConfigError> {
        for record in dataset.records() {
            let unknown = record
                .categories
                .keys()
                .find(|name| !self.max.contains_key(*name));
            if let Some(name) = unknown {
                return Err(ConfigError::UnknownCategory {
                    category: name.clone(),
                    date: record.date,
                });
            }
        }
        Ok(())
    }

    /// Per-day average of `sum` over `days`, as a percentage of the category's maximum.
    pub fn percentage(&self, category: &str, sum: i64, days: u32) -> Result<i64, DataError> {
        let max = self
            .max(category)
            .ok_or_else(|| DataError::UnknownCategory(category.to_string()))?;
        Ok(round_half_up((sum as f64 / f64::from(days)) * (100.0 / max as f64)))
    }
}

/// Rounds .5 toward positive infinity, matching the chart's display rounding.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl std::str::FromStr for Granularity {
    type Err = DataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(DataError::UnknownGranularity(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct AggregationRequest {
    pub granularity: Granularity,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub label: String,
    pub values: BTreeMap<String, i64>,
    pub days_in_bucket: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub granularity: Granularity,
    pub offset: u32,
    pub points: Vec<AggregatedPoint>,
    pub has_more_previous: bool,
    pub has_more_next: bool,
}

/// Aggregation as the analytics panel shows it: only the selected series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResponse {
    pub selected: Vec<String>,
    #[serde(flatten)]
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: i64,
    pub max: i64,
    pub percent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySnapshot {
    pub date: String,
    pub recorded: bool,
    pub score: i64,
    pub study: i64,
    pub study_percent: i64,
    pub categories: Vec<CategoryShare>,
}
