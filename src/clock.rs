//! Wall clock shown on the overlay.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt::Write;

pub const DEFAULT_FORMAT: &str = "%H:%M:%S";

/// Whether `format` is a usable strftime pattern.
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Render `now` with `format`, falling back to [`DEFAULT_FORMAT`].
pub fn clock_text<Tz>(now: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut text = String::new();
    if write!(text, "{}", now.format(format)).is_err() {
        text.clear();
        let _ = write!(text, "{}", now.format(DEFAULT_FORMAT));
    }
    text
}
