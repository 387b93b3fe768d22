//! Natural-language due dates ("tomorrow", "next friday", "in 3 days").

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

static DUE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    let day = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
    let pattern = format!(
        r"(?i)\s*\b(?:by|due|before)\s+(today|tomorrow|tmr|tom|{day}|next\s+(?:week|month|{day})|this\s+(?:{day})|in\s+\d+\s+days?)\b"
    );
    Regex::new(&pattern).expect("due phrase pattern is valid")
});

fn weekday(name: &str) -> Option<Weekday> {
    WEEKDAYS.iter().find(|(n, _)| *n == name).map(|(_, d)| *d)
}

/// Days from `today` to the next `target` strictly after today (1..=7).
fn days_until(today: NaiveDate, target: Weekday) -> i64 {
    let diff = i64::from(target.num_days_from_sunday()) - i64::from(today.weekday().num_days_from_sunday());
    if diff <= 0 {
        diff + 7
    } else {
        diff
    }
}

/// Parse a due-date phrase relative to `today`. `None` if unrecognized.
pub fn parse_natural_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    let text = trimmed.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    match text.as_str() {
        "today" => return Some(today),
        "tomorrow" | "tmr" | "tom" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        "next week" => return Some(today + Duration::days(7)),
        "next month" => return today.checked_add_months(Months::new(1)),
        _ => {}
    }

    let words: Vec<&str> = text.split(' ').collect();
    match words.as_slice() {
        ["in", n, "day" | "days"] => {
            let n: i64 = n.parse().ok()?;
            today.checked_add_signed(Duration::try_days(n)?)
        }
        ["this", day] => {
            let target = weekday(day)?;
            Some(today + Duration::days(days_until(today, target)))
        }
        ["next", day] => {
            let target = weekday(day)?;
            let diff = i64::from(target.num_days_from_sunday())
                - i64::from(today.weekday().num_days_from_sunday());
            Some(today + Duration::days(diff + 7))
        }
        [day] => {
            let target = weekday(day)?;
            Some(today + Duration::days(days_until(today, target)))
        }
        _ => None,
    }
}

/// Pull a "by friday" / "due tomorrow" phrase out of a task title.
///
/// Returns the title with the phrase removed and the parsed date, or the
/// untouched title and `None`.
pub fn extract_due_date(title: &str, today: NaiveDate) -> (String, Option<NaiveDate>) {
    let Some(caps) = DUE_PHRASE.captures(title) else {
        return (title.to_string(), None);
    };
    let (Some(whole), Some(phrase)) = (caps.get(0), caps.get(1)) else {
        return (title.to_string(), None);
    };
    match parse_natural_date(phrase.as_str(), today) {
        Some(date) => {
            let clean = format!("{}{}", &title[..whole.start()], &title[whole.end()..]);
            (clean.trim().to_string(), Some(date))
        }
        None => (title.to_string(), None),
    }
}
