use crate::anvl::{self, Record};
use crate::error::{EzidError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Outcome reported on the first line of an EZID response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Response represents an EZID ANVL response body.
/// The first line is the status line (`success: ...` or `error: ...`); the
/// remaining lines are the identifier's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// "success" or "error"
    pub status: Status,

    /// Text after the status label, e.g. the identifier or error reason
    pub message: String,

    /// Metadata lines, in response order
    #[serde(skip_serializing_if = "Record::is_empty", default)]
    pub metadata: Record,
}

impl Response {
    /// Parse a raw response body
    pub fn parse(text: &str) -> Result<Self> {
        let mut record = anvl::decode(text)?;
        let (label, message) = record.shift_remove_index(0).ok_or_else(|| EzidError::Anvl {
            line: 1,
            reason: "empty response".to_string(),
        })?;

        let status = match label.as_str() {
            "success" => Status::Success,
            "error" => Status::Error,
            other => {
                return Err(EzidError::Anvl {
                    line: 1,
                    reason: format!("unexpected status label {:?}", other),
                })
            }
        };

        Ok(Response {
            status,
            message,
            metadata: record,
        })
    }

    /// Check if the service reported success
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// First identifier named by a success message.
    ///
    /// Minting a DOI reports `doi:... | ark:...`; this returns the part before `|`.
    pub fn identifier(&self) -> Option<&str> {
        if !self.is_success() {
            return None;
        }
        self.message
            .split('|')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Get a metadata value by label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.metadata.get(label).map(String::as_str)
    }

    /// Creation time from `_created`
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.timestamp("_created")
    }

    /// Last update time from `_updated`
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.timestamp("_updated")
    }

    fn timestamp(&self, label: &str) -> Option<DateTime<Utc>> {
        let secs: i64 = self.get(label)?.trim().parse().ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}
