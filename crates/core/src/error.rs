// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::repository::RepositoryError;
use craftsbite_domain::{DomainError, UserId};
use thiserror::Error;

/// Errors returned by resolution, aggregation and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// The actor lacks the capability for the requested change.
    #[error("User '{actor}' is not permitted to {action}")]
    Forbidden {
        /// The acting user.
        actor: UserId,
        /// What the actor attempted.
        action: String,
    },
    /// A referenced entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// The kind of entity, e.g. `user`.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },
    /// A repository call failed.
    #[error("Upstream failure: {0}")]
    Upstream(#[from] RepositoryError),
}
