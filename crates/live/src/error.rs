// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors raised by the live hubs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// An event could not be encoded as JSON.
    #[error("Failed to serialize live event: {0}")]
    Serialization(String),
    /// The organization hub's actor task has stopped.
    #[error("Organization hub is not running")]
    Closed,
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
