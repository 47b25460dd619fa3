//! In-memory aggregation over records merged from every department.
//!
//! Handlers fetch raw documents from the store, concatenate them in
//! collection order, and hand them to the functions here. Titles are
//! compared case-insensitively throughout: [`title_key`] is the only place
//! that decides what "the same title" means.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::product::{
    ProductRecord, DATE, PRICE, PRICE_PER_100G, PRICE_PER_GRAM, TITLE,
};
use crate::models::summary::TitleStats;

pub const LOWEST_PRICE_PER_100G: &str = "lowestPricePer100g";
pub const AVERAGE_PRICE_PER_100G: &str = "averagePricePer100g";
pub const AVG_PRICE_PER_MONTH: &str = "avgPricePerMonth";

/// Fields a record must carry, non-null, to appear on the dashboard.
pub const DASHBOARD_FIELDS: [&str; 5] = [TITLE, DATE, PRICE, PRICE_PER_100G, PRICE_PER_GRAM];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

// Listing order folds to upper case, so `_` and `[` sort after letters.
fn sort_key(title: &str) -> String {
    title.to_uppercase()
}

/// Sorts by title and keeps the first record of each title.
///
/// The sort is stable, so among records sharing a title the one fetched
/// first survives. Records without a title are dropped.
pub fn sort_and_dedup(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut keyed: Vec<(String, ProductRecord)> = records
        .into_iter()
        .filter_map(|record| {
            let key = sort_key(record.title()?);
            Some((key, record))
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut seen = HashSet::new();
    keyed
        .into_iter()
        .map(|(_, record)| record)
        .filter(|record| record.title().is_some_and(|t| seen.insert(title_key(t))))
        .collect()
}

/// Copies each title's lowest and average `pricePer100g` onto the records.
/// Records whose title has no stats get explicit nulls.
pub fn attach_price_stats(records: &mut [ProductRecord], stats: &[TitleStats]) {
    let by_title: HashMap<&str, &TitleStats> =
        stats.iter().map(|s| (s.title_key.as_str(), s)).collect();

    for record in records.iter_mut() {
        let found = record
            .title()
            .map(title_key)
            .and_then(|key| by_title.get(key.as_str()).copied());

        let lowest = found.and_then(|s| s.lowest_price);
        let average = found.and_then(TitleStats::average_price);
        record.insert(LOWEST_PRICE_PER_100G, lowest);
        record.insert(AVERAGE_PRICE_PER_100G, average);
    }
}

pub fn find_by_title(records: Vec<ProductRecord>, title: &str) -> Option<ProductRecord> {
    let wanted = title_key(title);
    records
        .into_iter()
        .find(|r| r.title().map(title_key).as_deref() == Some(wanted.as_str()))
}

pub fn days_since(now: DateTime<Utc>, saved: DateTime<Utc>) -> f64 {
    (now - saved).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Whole days since the stalest record was saved, rounded up.
/// `None` when no record has a usable date.
pub fn stalest_days<'a>(
    records: impl IntoIterator<Item = &'a ProductRecord>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let max = records
        .into_iter()
        .filter_map(ProductRecord::date)
        .map(|saved| days_since(now, saved))
        .fold(f64::NEG_INFINITY, f64::max);

    max.is_finite().then(|| max.ceil() as i64)
}

pub fn month_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m").to_string()
}

/// Mean `pricePer100g` per `YYYY-MM` for every observation of `title`,
/// formatted to two decimals. Observations without a date or price are
/// skipped.
pub fn monthly_averages(title: &str, observations: &[ProductRecord]) -> BTreeMap<String, String> {
    let wanted = title_key(title);
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for entry in observations {
        if entry.title().map(title_key).as_deref() != Some(wanted.as_str()) {
            continue;
        }
        let (Some(date), Some(price)) = (entry.date(), entry.price_per_100g()) else {
            continue;
        };
        let bucket = buckets.entry(month_key(date)).or_insert((0.0, 0));
        bucket.0 += price;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(month, (sum, count))| (month, format!("{:.2}", sum / count as f64)))
        .collect()
}

/// Dedupes `observations` and attaches `avgPricePerMonth` to each survivor,
/// averaging over the full, undeduplicated set.
pub fn price_history(observations: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut deduped = sort_and_dedup(observations.clone());

    for record in deduped.iter_mut() {
        let Some(title) = record.title().map(str::to_owned) else { continue };
        let months: Map<String, Value> = monthly_averages(&title, &observations)
            .into_iter()
            .map(|(month, avg)| (month, Value::String(avg)))
            .collect();
        record.insert(AVG_PRICE_PER_MONTH, Value::Object(months));
    }

    deduped
}

pub fn is_dashboard_valid(record: &ProductRecord) -> bool {
    DASHBOARD_FIELDS.iter().all(|f| record.has(f))
        && record.title().is_some_and(|t| !t.trim().is_empty())
}

/// Newest first; records without a usable date go last.
pub fn compare_dates_desc(a: &ProductRecord, b: &ProductRecord) -> Ordering {
    match (a.date(), b.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_by_date_desc(records: &mut [ProductRecord]) {
    records.sort_by(compare_dates_desc);
}
