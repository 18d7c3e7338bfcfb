//! `gasdepot-pricing` — append-only price history.

pub mod history;

pub use history::{needs_new_entry, same_calendar_month, PricePoint};
