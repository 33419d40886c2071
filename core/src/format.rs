use chrono::{NaiveDate, NaiveDateTime};

const TEN_THOUSAND: u64 = 10_000;

/// `MM-DD`, as shown on event cards.
pub fn card_date(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM`, as shown on the detail page.
pub fn publish_time(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Counts from ten thousand up collapse to one decimal with the `万` suffix.
pub fn view_count(count: u64) -> String {
    if count >= TEN_THOUSAND {
        format!("{:.1}万", count as f64 / TEN_THOUSAND as f64)
    } else {
        count.to_string()
    }
}

pub fn view_count_label(count: u64) -> String {
    if count == 1 {
        "1 view".to_string()
    } else {
        format!("{count} views")
    }
}
