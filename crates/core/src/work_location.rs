// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::repository::WorkLocationRepository;
use chrono::NaiveDate;
use craftsbite_domain::{GlobalWorkLocationPolicy, UserId, WorkLocation, WorkLocationStatus};
use serde::{Deserialize, Serialize};

/// Which rule produced a work location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// A company-wide policy covers the date.
    GlobalPolicy,
    /// The user has an explicit status for the date.
    Explicit,
    /// Nothing applied; office.
    Default,
}

impl LocationSource {
    /// Converts this source to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalPolicy => "global_policy",
            Self::Explicit => "explicit",
            Self::Default => "default",
        }
    }
}

/// A resolved work location and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDecision {
    /// Where the user works.
    pub location: WorkLocation,
    /// The rule that decided.
    pub source: LocationSource,
}

/// Resolves where a user works on a date.
///
/// An active global policy always outranks the user's own status.
#[derive(Debug)]
pub struct WorkLocationResolver<'a, R: ?Sized> {
    repository: &'a R,
}

impl<'a, R> WorkLocationResolver<'a, R>
where
    R: WorkLocationRepository + ?Sized,
{
    /// Creates a resolver over `repository`.
    #[must_use]
    pub const fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Resolves the work location for `(user_id, date)`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Upstream` if a repository call fails.
    pub fn resolve(&self, user_id: &UserId, date: NaiveDate) -> Result<LocationDecision, CoreError> {
        let policy: Option<GlobalWorkLocationPolicy> =
            self.repository.find_active_global_policy(date)?;
        self.resolve_with_policy(user_id, date, policy.as_ref())
    }

    /// Resolves with the date's policy already looked up.
    ///
    /// Used when resolving many users for one date.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Upstream` if a repository call fails.
    pub fn resolve_with_policy(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        policy: Option<&GlobalWorkLocationPolicy>,
    ) -> Result<LocationDecision, CoreError> {
        if let Some(policy) = policy.filter(|p| p.covers(date)) {
            return Ok(LocationDecision {
                location: policy.location,
                source: LocationSource::GlobalPolicy,
            });
        }

        let status: Option<WorkLocationStatus> =
            self.repository.find_work_location_status(user_id, date)?;
        Ok(status.map_or(
            LocationDecision {
                location: WorkLocation::Office,
                source: LocationSource::Default,
            },
            |status| LocationDecision {
                location: status.location,
                source: LocationSource::Explicit,
            },
        ))
    }
}
