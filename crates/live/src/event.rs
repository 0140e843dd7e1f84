// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::HubError;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use craftsbite::DailySummary;
use serde::Serialize;
use std::sync::Arc;

/// Live event payloads.
///
/// Events are informational snapshots derived from accepted mutations. They
/// are never the source of truth; clients re-read over HTTP after reconnecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// Connection confirmation, sent once when a stream opens.
    Connected {
        /// Server timestamp (RFC 3339).
        timestamp: String,
    },
    /// The full summary of a date after a change.
    HeadcountUpdated {
        /// The summarized date.
        date: NaiveDate,
        /// The recomputed summary.
        summary: DailySummary,
    },
}

impl LiveEvent {
    /// Builds the connection confirmation for `now`.
    #[must_use]
    pub fn connected(now: DateTime<Utc>) -> Self {
        Self::Connected {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Wraps a recomputed summary.
    #[must_use]
    pub const fn headcount_updated(summary: DailySummary) -> Self {
        Self::HeadcountUpdated {
            date: summary.date,
            summary,
        }
    }

    /// The server-sent-events event name for this payload.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::HeadcountUpdated { .. } => "headcount-update",
        }
    }

    /// Encodes the event once for fan-out to many subscribers.
    ///
    /// # Errors
    ///
    /// Returns `HubError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<Arc<str>, HubError> {
        let json: String = serde_json::to_string(self)?;
        Ok(Arc::from(json))
    }
}
