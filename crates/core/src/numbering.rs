//! Human-readable document numbers.
//!
//! Every business document carries a number of the shape
//! `<PREFIX>-<period>-<zero-padded sequence>`, where the sequence counter is
//! scoped to the period. Numbering is an explicit orchestration step executed
//! before persistence; the counters themselves live in the store.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// The period a sequence counter is scoped to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// `YYMM` — purchase orders, production orders, expenses, capital
    /// transactions.
    Month,
    /// `YYMMDD` — movements and sale invoices.
    Day,
}

impl Period {
    /// Render the period component for a point in time.
    pub fn stamp(self, at: DateTime<Utc>) -> String {
        let yy = at.year() % 100;
        match self {
            Period::Month => format!("{:02}{:02}", yy, at.month()),
            Period::Day => format!("{:02}{:02}{:02}", yy, at.month(), at.day()),
        }
    }
}

/// A fully-formatted document number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    /// Format `<prefix>-<period stamp>-<sequence zero-padded to width>`.
    pub fn format(
        prefix: &str,
        period: Period,
        at: DateTime<Utc>,
        sequence: u64,
        width: usize,
    ) -> Self {
        Self(format!(
            "{}-{}-{:0width$}",
            prefix,
            period.stamp(at),
            sequence,
            width = width
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DocumentNumber> for String {
    fn from(value: DocumentNumber) -> Self {
        value.0
    }
}
