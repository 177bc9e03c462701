use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};

use crate::config::Config;
use crate::error::{FETCH_STATUS_MESSAGE, SyncError};
use crate::record::Submission;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// The spreadsheet acting as the database
///
/// Reads return the whole sheet as CSV text; writes append one row.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    async fn fetch_csv(&self) -> Result<String, SyncError>;

    async fn append(&self, submission: &Submission) -> Result<(), SyncError>;
}

/// Sheet reached over HTTP: a published CSV export and a form endpoint.
pub struct HttpSheet {
    read_url: String,
    write_url: String,
    http: Client,
}

impl HttpSheet {
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        config.validate()?;
        let http = Client::builder()
            .build()
            .map_err(|e| SyncError::Config(format!("could not build HTTP client: {e}")))?;

        Ok(HttpSheet {
            read_url: config.read_url.trim().to_string(),
            write_url: config.write_url.trim().to_string(),
            http,
        })
    }
}

#[async_trait]
impl SheetBackend for HttpSheet {
    async fn fetch_csv(&self) -> Result<String, SyncError> {
        let url = cache_busted(&self.read_url, Utc::now().timestamp_millis());
        log::debug!("fetching sheet from {}", url);

        let response = self
            .http
            .get(&url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            log::warn!("read endpoint answered {}", response.status());
            return Err(SyncError::Fetch(FETCH_STATUS_MESSAGE.to_string()));
        }

        response
            .text()
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))
    }

    async fn append(&self, submission: &Submission) -> Result<(), SyncError> {
        let response = self
            .http
            .post(&self.write_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(submission.to_form_body())
            .send()
            .await
            .map_err(|e| SyncError::Write(e.to_string()))?;

        let ok = response.status().is_success();
        let body = response.text().await.unwrap_or_default();

        if ok && is_acknowledged(&body) {
            Ok(())
        } else {
            Err(SyncError::write_rejected(&body))
        }
    }
}

/// The write endpoint answers exactly `ok` (any case, surrounding blanks allowed).
pub fn is_acknowledged(body: &str) -> bool {
    body.trim().to_lowercase() == "ok"
}

/// Appends `t=<millis>` so intermediary caches cannot serve a stale sheet.
pub fn cache_busted(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}t={millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledgement_is_trimmed_and_case_insensitive() {
        assert!(is_acknowledged("OK\n"));
        assert!(is_acknowledged("  ok "));
        assert!(!is_acknowledged("ok please retry"));
        assert!(!is_acknowledged(""));
        assert!(!is_acknowledged("error: sheet locked"));
    }

    #[test]
    fn cache_buster_picks_separator() {
        assert_eq!(
            cache_busted("https://example.com/pub?output=csv", 42),
            "https://example.com/pub?output=csv&t=42"
        );
        assert_eq!(cache_busted("https://example.com/a.csv", 7), "https://example.com/a.csv?t=7");
    }

    #[test]
    fn http_sheet_requires_valid_config() {
        let config = Config::new("", "https://example.com/exec");
        assert!(HttpSheet::new(&config).is_err());
    }
}
