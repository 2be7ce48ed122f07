use crate::errors::DataError;
use crate::models::{
    format_feed_date, round_half_up, AggregatedPoint, Aggregation, AggregationRequest,
    CategoryRanges, CategoryShare, DailyRecord, Dataset, Granularity, TodaySnapshot, SCORE, STUDY,
    STUDY_PARTS,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::BTreeMap;

const DAILY_WINDOW: usize = 7;
const WEEKS_PER_WINDOW: i64 = 4;
const DAYS_PER_WINDOW: i64 = WEEKS_PER_WINDOW * 7;
const MONTHS_PER_WINDOW: u32 = 4;

/// Categories shown on the today ring, in display order.
const SNAPSHOT_CATEGORIES: [&str; 6] = ["Health", "Routine", "Rest", "SS1", "SS2", "SS3"];

pub fn aggregate(
    dataset: &Dataset,
    request: AggregationRequest,
    ranges: &CategoryRanges,
) -> Result<Aggregation, DataError> {
    aggregate_at(Local::now().date_naive(), dataset, request, ranges)
}

pub fn aggregate_at(
    today: NaiveDate,
    dataset: &Dataset,
    request: AggregationRequest,
    ranges: &CategoryRanges,
) -> Result<Aggregation, DataError> {
    let window = match request.granularity {
        Granularity::Daily => daily(dataset, request.offset),
        Granularity::Weekly => weekly(today, dataset, request.offset, ranges)?,
        Granularity::Monthly => monthly(today, dataset, request.offset, ranges)?,
    };

    Ok(Aggregation {
        granularity: request.granularity,
        offset: request.offset,
        points: window.points,
        has_more_previous: window.has_more_previous,
        has_more_next: window.has_more_next,
    })
}

struct Window {
    points: Vec<AggregatedPoint>,
    has_more_previous: bool,
    has_more_next: bool,
}

fn daily(dataset: &Dataset, offset: u32) -> Window {
    let records = dataset.records();
    let offset = offset as usize;
    let end = records.len().saturating_sub(offset);
    let start = records.len().saturating_sub(DAILY_WINDOW.saturating_add(offset));

    let points = records[start..end]
        .iter()
        .map(|record| {
            let mut values = record.categories.clone();
            values.insert(SCORE.to_string(), record.score);
            values.insert(STUDY.to_string(), record.study());
            AggregatedPoint {
                label: record.date.format("%a").to_string(),
                values,
                days_in_bucket: 1,
            }
        })
        .collect();

    Window {
        points,
        has_more_previous: start > 0,
        has_more_next: offset > 0,
    }
}

fn weekly(
    today: NaiveDate,
    dataset: &Dataset,
    offset: u32,
    ranges: &CategoryRanges,
) -> Result<Window, DataError> {
    let reference = today
        .checked_sub_signed(Duration::days(DAYS_PER_WINDOW * i64::from(offset)))
        .unwrap_or(NaiveDate::MIN);
    let past_bound = reference
        .checked_sub_signed(Duration::days(DAYS_PER_WINDOW))
        .unwrap_or(NaiveDate::MIN);

    let mut weeks: BTreeMap<i64, Bucket> = BTreeMap::new();
    for record in in_window(dataset, past_bound, reference) {
        let days_diff = (reference - record.date).num_days();
        let week = WEEKS_PER_WINDOW - days_diff / 7;
        weeks
            .entry(week)
            .or_insert_with(|| Bucket::new(record.date, ranges))
            .add(record);
    }

    let points = weeks
        .into_iter()
        .map(|(week, bucket)| bucket.into_point(format!("Week {week}"), ranges))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Window {
        points,
        has_more_previous: has_records_through(dataset, past_bound),
        has_more_next: offset > 0 && has_records_after(dataset, reference),
    })
}

fn monthly(
    today: NaiveDate,
    dataset: &Dataset,
    offset: u32,
    ranges: &CategoryRanges,
) -> Result<Window, DataError> {
    // Pages tile calendar months: page `offset` covers months back in `[newest, oldest)`.
    let newest = i64::from(MONTHS_PER_WINDOW) * i64::from(offset);
    let oldest = newest + i64::from(MONTHS_PER_WINDOW);
    let months_back = |date: NaiveDate| {
        i64::from(today.year() - date.year()) * 12 + i64::from(today.month())
            - i64::from(date.month())
    };

    let mut months: BTreeMap<i64, Bucket> = BTreeMap::new();
    for record in dataset.records() {
        let back = months_back(record.date);
        if back < newest || back >= oldest {
            continue;
        }
        months
            .entry(back)
            .or_insert_with(|| Bucket::new(record.date, ranges))
            .add(record);
    }

    let points = months
        .into_values()
        .rev()
        .map(|bucket| {
            let label = bucket.first_day.format("%b").to_string();
            bucket.into_point(label, ranges)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let records = dataset.records();
    Ok(Window {
        points,
        has_more_previous: records
            .first()
            .is_some_and(|record| months_back(record.date) >= oldest),
        has_more_next: offset > 0
            && records
                .last()
                .is_some_and(|record| months_back(record.date) < newest),
    })
}

/// Records dated in `(after, through]`.
fn in_window(
    dataset: &Dataset,
    after: NaiveDate,
    through: NaiveDate,
) -> impl Iterator<Item = &DailyRecord> {
    dataset
        .records()
        .iter()
        .filter(move |record| record.date > after && record.date <= through)
}

fn has_records_through(dataset: &Dataset, date: NaiveDate) -> bool {
    dataset.records().first().is_some_and(|record| record.date <= date)
}

fn has_records_after(dataset: &Dataset, date: NaiveDate) -> bool {
    dataset.records().last().is_some_and(|record| record.date > date)
}

struct Bucket {
    first_day: NaiveDate,
    days: u32,
    score: i64,
    study: i64,
    sums: BTreeMap<String, i64>,
}

impl Bucket {
    fn new(first_day: NaiveDate, ranges: &CategoryRanges) -> Self {
        let sums = ranges
            .names()
            .filter(|name| *name != SCORE && *name != STUDY)
            .map(|name| (name.to_string(), 0))
            .collect();
        Self {
            first_day,
            days: 0,
            score: 0,
            study: 0,
            sums,
        }
    }

    fn add(&mut self, record: &DailyRecord) {
        self.days += 1;
        self.score = self.score.saturating_add(record.score);
        self.study = self.study.saturating_add(record.study());
        for (name, value) in &record.categories {
            let sum = self.sums.entry(name.clone()).or_default();
            *sum = sum.saturating_add(*value);
        }
    }

    fn into_point(
        self,
        label: String,
        ranges: &CategoryRanges,
    ) -> Result<AggregatedPoint, DataError> {
        let mut values = BTreeMap::new();
        let score = ranges.percentage(SCORE, self.score, self.days)?;
        values.insert(SCORE.to_string(), score);
        let study = ranges.percentage(STUDY, self.study, self.days)?;
        values.insert(STUDY.to_string(), study);
        for (name, sum) in self.sums {
            let percent = ranges.percentage(&name, sum, self.days)?;
            values.insert(name, percent);
        }

        Ok(AggregatedPoint {
            label,
            values,
            days_in_bucket: self.days,
        })
    }
}

pub fn today_snapshot(
    dataset: &Dataset,
    date: NaiveDate,
    ranges: &CategoryRanges,
) -> Result<TodaySnapshot, DataError> {
    let record = dataset.find(date);
    let value = |name: &str| record.map(|record| record.category(name)).unwrap_or(0);
    let max = |name: &str| {
        ranges
            .max(name)
            .ok_or_else(|| DataError::UnknownCategory(name.to_string()))
    };

    let categories = SNAPSHOT_CATEGORIES
        .iter()
        .map(|&name| {
            let value = value(name);
            let max = max(name)?;
            Ok(CategoryShare {
                name: name.to_string(),
                value,
                max,
                percent: round_half_up(value as f64 / max as f64 * 100.0),
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    let study = STUDY_PARTS
        .iter()
        .fold(0i64, |total, &part| total.saturating_add(value(part)));
    let study_percent = (study.saturating_mul(100) as f64 / max(STUDY)? as f64).ceil() as i64;

    Ok(TodaySnapshot {
        date: format_feed_date(date),
        recorded: record.is_some(),
        score: record.map(|record| record.score).unwrap_or(0),
        study,
        study_percent,
        categories,
    })
}
