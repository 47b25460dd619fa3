// src/dtos/catalog.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::stalest_days;
use crate::models::product::{ProductRecord, PRICE};

/// Size and staleness of the scraped data set.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordCount {
    pub records_of_data: usize,
    pub days_count: Option<i64>,
}

impl RecordCount {
    pub fn new(records: &[ProductRecord], now: DateTime<Utc>) -> Self {
        Self {
            records_of_data: records.len(),
            days_count: stalest_days(records, now),
        }
    }
}

/// Drop-down entry: just enough of a record to pick a product.
#[derive(Debug, Serialize, PartialEq)]
pub struct TitleListItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// Convert from stored record to list entry
impl From<ProductRecord> for TitleListItem {
    fn from(record: ProductRecord) -> Self {
        Self {
            title: record.title().unwrap_or_default().to_string(),
            price: record.get(PRICE).cloned(),
            url: record.url().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_count_serializes_camel_case() {
        let now = "2024-05-10T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let records = vec![
            ProductRecord::from_value(json!({"date": "2024-05-08T12:00:00Z"})).unwrap(),
            ProductRecord::from_value(json!({"title": "no date"})).unwrap(),
        ];

        let value = serde_json::to_value(RecordCount::new(&records, now)).unwrap();
        assert_eq!(value, json!({"recordsOfData": 2, "daysCount": 2}));
    }

    #[test]
    fn empty_data_set_has_null_days() {
        let value = serde_json::to_value(RecordCount::new(&[], Utc::now())).unwrap();
        assert_eq!(value, json!({"recordsOfData": 0, "daysCount": null}));
    }

    #[test]
    fn list_item_omits_missing_fields() {
        let record = ProductRecord::from_value(json!({"title": "Rye", "price": 2.5, "pricePer100g": 0.5})).unwrap();
        let value = serde_json::to_value(TitleListItem::from(record)).unwrap();
        assert_eq!(value, json!({"title": "Rye", "price": 2.5}));
    }
}
