use chrono::{DateTime, Local, NaiveDate, Utc};

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

/// Today's date in the local timezone, used as the reference for age rules.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local calendar date of a unix timestamp; out-of-range values clamp to the epoch.
pub fn timestamp_local_date(ts: i64) -> NaiveDate {
    to_local(ts).date_naive()
}

pub fn format_timestamp_date(ts: i64) -> String {
    to_local(ts).format("%Y-%m-%d").to_string()
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    to_local(ts).format("%Y-%m-%d %H:%M").to_string()
}

/// Brazilian display form of a date.
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn to_local(ts: i64) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .with_timezone(&Local)
}
