use sqlx::FromRow;

/// Per-title grouping over one collection: minimum, sum and count of
/// `pricePer100g`. `title_key` is the case-folded title.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TitleStats {
    pub title_key: String,
    pub lowest_price: Option<f64>,
    pub total_price: f64,
    pub count: i64,
}

impl TitleStats {
    /// Mean over every document of the title, rounded to 3 decimals.
    /// Documents without a usable price still count toward the divisor.
    pub fn average_price(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(round_to(self.total_price / self.count as f64, 3))
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
