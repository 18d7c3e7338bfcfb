use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use gasdepot_core::{PriceEntryId, ProductId};

/// One immutable point in a product's price history.
///
/// Prices are integers in the smallest currency unit, so equality is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: PriceEntryId,
    pub product_id: ProductId,
    pub price: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Calendar year+month comparison (not a rolling 30-day window).
pub fn same_calendar_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Whether an order line at `submitted` requires a new history entry,
/// given the latest price already recorded this month (if any).
///
/// A new entry is appended when the month has no entry yet, or when the
/// submitted price differs from the month's latest.
pub fn needs_new_entry(latest_this_month: Option<i64>, submitted: i64) -> bool {
    match latest_this_month {
        None => true,
        Some(latest) => latest != submitted,
    }
}
