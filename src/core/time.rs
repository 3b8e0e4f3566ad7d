//! Timestamp helpers: backup-name stamps and display formatting.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// `YYYY-MM-DD-HHMMSS`, second resolution.
pub const BACKUP_STAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";
const BACKUP_STAMP_LEN: usize = 17;
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn backup_stamp(at: DateTime<Local>) -> String {
    at.format(BACKUP_STAMP_FORMAT).to_string()
}

/// Split `<repo>-<stamp>[.<n>]` into the repo base name and its stamp.
pub fn split_backup_name(name: &str) -> Option<(&str, NaiveDateTime)> {
    let head = match name.rsplit_once('.') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => name,
    };

    let split_at = head.len().checked_sub(BACKUP_STAMP_LEN + 1)?;
    if !head.is_char_boundary(split_at) {
        return None;
    }
    let (repo, rest) = head.split_at(split_at);
    let stamp = rest.strip_prefix('-')?;
    let parsed = NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP_FORMAT).ok()?;
    Some((repo, parsed))
}

pub fn parse_backup_stamp(name: &str) -> Option<NaiveDateTime> {
    split_backup_name(name).map(|(_, at)| at)
}

pub fn display_utc(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}

pub fn display_naive(at: &NaiveDateTime) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}
