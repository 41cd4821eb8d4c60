use chrono::{DateTime, Utc};

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn format_utc(now: &DateTime<Utc>, pattern: &str) -> String {
    now.format(pattern).to_string()
}

pub fn utc_rfc3339(now: &DateTime<Utc>) -> String {
    now.to_rfc3339()
}
