use chrono::{DateTime, Local};

/// Format used for every `LocalTimestamp` node value
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_local(time: DateTime<Local>) -> String {
    time.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}

pub fn now_local() -> String {
    format_local(Local::now())
}
