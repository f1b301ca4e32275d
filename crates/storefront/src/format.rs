//! Display formatting for prices, dates and long text.

use chrono::NaiveDateTime;
use shopline_core::Price;

/// Default length for [`truncate_text`].
pub const DEFAULT_TRUNCATE_CHARS: usize = 50;

/// `$1,299.5`, `-$20`.
#[must_use]
pub fn format_price(price: Price) -> String {
    let amount = price.amount();
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${}", Price::new(amount.abs()))
    } else {
        format!("${price}")
    }
}

/// `2024/03/01`; empty when unknown.
#[must_use]
pub fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}

/// `2024/03/01 09:30`; empty when unknown.
#[must_use]
pub fn format_date_time(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%Y/%m/%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 5)
            .unwrap()
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Price::from_cents(129_950)), "$1,299.5");
        assert_eq!(format_price(Price::ZERO), "$0");
        assert_eq!(format_price(Price::from_cents(-2_000)), "-$20");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date(Some(at(9, 30))), "2024/03/01");
        assert_eq!(format_date_time(Some(at(9, 30))), "2024/03/01 09:30");
        assert_eq!(format_date(None), "");
        assert_eq!(format_date_time(None), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("a longer description", 8), "a longer...");
        assert_eq!(truncate_text("茶杯茶壺茶葉", 2), "茶杯...");
    }
}
