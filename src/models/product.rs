use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TITLE: &str = "title";
pub const PRICE: &str = "price";
pub const PRICE_PER_100G: &str = "pricePer100g";
pub const PRICE_PER_GRAM: &str = "pricePerGram";
pub const DATE: &str = "date";
pub const URL: &str = "url";

/// Store department a scraped record belongs to. Each one is a separate
/// logical collection in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Meat,
    Bakery,
    Produce,
    CannedAndDry,
    FrozenFood,
    Refrigerated,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Meat,
        Collection::Bakery,
        Collection::Produce,
        Collection::CannedAndDry,
        Collection::FrozenFood,
        Collection::Refrigerated,
    ];

    /// Name of the collection as the scraper writes it.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Meat => "meatdepartments",
            Collection::Bakery => "bakerydepartments",
            Collection::Produce => "producedepartments",
            Collection::CannedAndDry => "cannedanddrydepartments",
            Collection::FrozenFood => "frozenfooddepartments",
            Collection::Refrigerated => "refrigeratedfoodsections",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// One scraped price observation.
///
/// The scraper owns the document shape, so the record keeps every field it
/// was stored with and only interprets the handful the catalog needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRecord(Map<String, Value>);

impl ProductRecord {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get(TITLE).and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get(URL).and_then(Value::as_str)
    }

    pub fn price(&self) -> Option<f64> {
        self.number(PRICE)
    }

    pub fn price_per_100g(&self) -> Option<f64> {
        self.number(PRICE_PER_100G)
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.0.get(DATE).and_then(parse_date)
    }

    /// True when the field exists and is not JSON `null`.
    pub fn has(&self, field: &str) -> bool {
        !matches!(self.0.get(field), None | Some(Value::Null))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Numeric field, also read from plain decimal strings like `"-1.25"`.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }
}

// Same grammar the Postgres store accepts: -?[0-9]+(\.[0-9]+)?
fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    if !digits(whole) || !fraction.map_or(true, digits) {
        return None;
    }
    s.parse().ok()
}

// Dates arrive as RFC 3339 strings, epoch millis, or Mongo extended JSON.
fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(obj) => match obj.get("$date")? {
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            other => parse_date(other),
        },
        _ => None,
    }
}
