//! Delivery estimates for committed orders.

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};

/// Orders placed at or after this hour ship from the next day.
const SAME_DAY_CUTOFF_HOUR: u32 = 18;

/// Days from dispatch to delivery.
const DELIVERY_DAYS: u64 = 7;

/// Output format for `delivery_eta`.
pub const ETA_FORMAT: &str = "%Y-%m-%d";

/// Estimated delivery date for an order placed at `created_at`.
#[must_use]
pub fn delivery_eta(created_at: NaiveDateTime) -> NaiveDate {
    let mut date = created_at.date();
    if created_at.hour() >= SAME_DAY_CUTOFF_HOUR {
        date = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    }
    date.checked_add_days(Days::new(DELIVERY_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// [`delivery_eta`] formatted as `YYYY-MM-DD`.
#[must_use]
pub fn format_delivery_eta(created_at: NaiveDateTime) -> String {
    delivery_eta(created_at).format(ETA_FORMAT).to_string()
}
