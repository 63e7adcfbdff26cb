//! Human-readable formatting for the file listing.
//!
//! All functions are pure; "now" is always passed in so the listing can be
//! rendered deterministically in tests.

use chrono::{DateTime, Local, Utc};

use crate::files::{sort_newest_first, FileRecord};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Format a byte count using the largest unit that keeps the value below 1024.
///
/// Values are rounded to two decimals with trailing zeros dropped, so
/// `1536` becomes `"1.5 KB"`. Anything past the GB range stays in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit < SIZE_UNITS.len() - 1 && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = bytes as f64 / divisor as f64;
    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format an upload time relative to `now`.
///
/// The distance is counted in whole days rounded up, so anything within the
/// last 24 hours reads "Today" and 24-48 hours reads "Yesterday".
pub fn format_relative_date(uploaded_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (now - uploaded_at).num_milliseconds().abs();
    let diff_days = (diff_ms + MS_PER_DAY - 1) / MS_PER_DAY;

    match diff_days {
        1 => "Today".to_string(),
        2 => "Yesterday".to_string(),
        3..=7 => format!("{} days ago", diff_days - 1),
        _ => format_absolute_date(uploaded_at),
    }
}

/// Local calendar date, month/day/year.
pub fn format_absolute_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

/// Relative date for a raw record, `"Invalid Date"` when the timestamp does not parse.
pub fn format_record_date(record: &FileRecord, now: DateTime<Utc>) -> String {
    match record.uploaded_at() {
        Some(at) => format_relative_date(at, now),
        None => "Invalid Date".to_string(),
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the listing as HTML markup, newest first, with every name escaped.
pub fn render_listing_html(records: &[FileRecord], now: DateTime<Utc>) -> String {
    if records.is_empty() {
        return concat!(
            "<div class=\"no-files\">\n",
            "    <i class=\"fas fa-inbox\"></i>\n",
            "    <p>No files uploaded yet</p>\n",
            "</div>\n"
        )
        .to_string();
    }

    let mut sorted = records.to_vec();
    sort_newest_first(&mut sorted);

    let mut html = String::new();
    for record in &sorted {
        html.push_str("<div class=\"file-item\">\n");
        html.push_str("    <div class=\"file-name\">\n");
        html.push_str("        <i class=\"fas fa-file\"></i>\n");
        html.push_str(&format!("        {}\n", escape_html(&record.name)));
        html.push_str("    </div>\n");
        html.push_str("    <div class=\"file-meta\">\n");
        html.push_str(&format!(
            "        <span class=\"file-size\">{}</span>\n",
            format_file_size(record.size)
        ));
        html.push_str(&format!(
            "        <span class=\"file-date\">{}</span>\n",
            escape_html(&format_record_date(record, now))
        ));
        html.push_str("    </div>\n");
        html.push_str("</div>\n");
    }
    html
}
