use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Separator used between the normalized fields of a fingerprint
const FINGERPRINT_SEPARATOR: char = '|';

/// Naive layouts tried after RFC 3339 / RFC 2822, read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// One contribution to the list
///
/// Every field is free text and may be empty. `created_at` is whatever the
/// sheet holds for the row, usually ISO-8601 but the spreadsheet is free to
/// reformat it, so it is kept verbatim and only parsed when sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub item: String,
    pub qty: String,
    pub note: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Record {
    pub fn new(name: &str, item: &str, qty: &str, note: &str, created_at: &str) -> Self {
        Record {
            name: name.to_string(),
            item: item.to_string(),
            qty: qty.to_string(),
            note: note.to_string(),
            created_at: created_at.to_string(),
        }
    }

    /// Builds the optimistic row for an accepted submission.
    ///
    /// Fields are trimmed; the timestamp is `now` in RFC 3339 with
    /// millisecond precision, the same shape the sheet writes.
    pub fn from_submission(submission: &Submission, now: DateTime<Utc>) -> Self {
        Record {
            name: submission.name.trim().to_string(),
            item: submission.item.trim().to_string(),
            qty: submission.qty.trim().to_string(),
            note: submission.note.trim().to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// A row only exists in the sheet when it names someone or something.
    pub fn is_present(&self) -> bool {
        !self.name.trim().is_empty() || !self.item.trim().is_empty()
    }

    /// Deduplication key: name, item, qty and note, trimmed and lower-cased.
    ///
    /// `created_at` is deliberately left out since the sheet may rewrite it.
    pub fn fingerprint(&self) -> String {
        let mut key = String::new();
        for (i, field) in [&self.name, &self.item, &self.qty, &self.note]
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                key.push(FINGERPRINT_SEPARATOR);
            }
            key.push_str(&field.trim().to_lowercase());
        }
        key
    }

    /// Milliseconds since the epoch of `created_at`, or 0 when unparsable.
    pub fn timestamp_millis(&self) -> i64 {
        parse_timestamp_millis(&self.created_at).unwrap_or(0)
    }
}

/// Free function form of [`Record::fingerprint`].
pub fn fingerprint(record: &Record) -> String {
    record.fingerprint()
}

/// Parses the timestamp layouts the sheet is known to produce.
///
/// Returns `None` for anything else; callers treat that as the epoch.
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }
    None
}

/// The fields a person types into the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub note: String,
}

impl Submission {
    pub fn new(name: &str, item: &str, qty: &str, note: &str) -> Self {
        Submission {
            name: name.to_string(),
            item: item.to_string(),
            qty: qty.to_string(),
            note: note.to_string(),
        }
    }

    /// Name and item must both be non-blank.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.name.trim().is_empty() || self.item.trim().is_empty() {
            return Err(SyncError::validation());
        }
        Ok(())
    }

    /// Urlencoded body for the write endpoint, fields sent as typed.
    pub fn to_form_body(&self) -> String {
        [
            ("name", &self.name),
            ("item", &self.item),
            ("qty", &self.qty),
            ("note", &self.note),
        ]
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
    }

    /// Forgets everything but the name, ready for the next entry.
    pub fn clear_keep_name(&mut self) {
        self.item.clear();
        self.qty.clear();
        self.note.clear();
    }
}
