// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{FakeRepository, date};
use crate::{CoreError, LocationDecision, LocationSource, WorkLocationResolver};
use craftsbite_domain::{Role, UserId, WorkLocation};

#[test]
fn test_default_location_is_office() {
    let repo: FakeRepository = FakeRepository::new().with_user("u1", Role::Employee);
    let decision: LocationDecision = WorkLocationResolver::new(&repo)
        .resolve(&UserId::new("u1"), date("2025-06-03"))
        .unwrap();
    assert_eq!(decision.location, WorkLocation::Office);
    assert_eq!(decision.source, LocationSource::Default);
}

#[test]
fn test_explicit_status_applies() {
    let repo: FakeRepository = FakeRepository::new()
        .with_user("u1", Role::Employee)
        .with_location("u1", date("2025-06-03"), WorkLocation::Wfh);
    let decision: LocationDecision = WorkLocationResolver::new(&repo)
        .resolve(&UserId::new("u1"), date("2025-06-03"))
        .unwrap();
    assert_eq!(decision.location, WorkLocation::Wfh);
    assert_eq!(decision.source, LocationSource::Explicit);
}

#[test]
fn test_global_policy_outranks_explicit_status() {
    let repo: FakeRepository = FakeRepository::new()
        .with_user("u1", Role::Employee)
        .with_location("u1", date("2025-06-03"), WorkLocation::Office)
        .with_policy(date("2025-06-01"), date("2025-06-07"), WorkLocation::Wfh, true);
    let decision: LocationDecision = WorkLocationResolver::new(&repo)
        .resolve(&UserId::new("u1"), date("2025-06-03"))
        .unwrap();
    assert_eq!(decision.location, WorkLocation::Wfh);
    assert_eq!(decision.source, LocationSource::GlobalPolicy);
}

#[test]
fn test_inactive_policy_is_ignored() {
    let repo: FakeRepository = FakeRepository::new()
        .with_user("u1", Role::Employee)
        .with_policy(date("2025-06-01"), date("2025-06-07"), WorkLocation::Wfh, false);
    let decision: LocationDecision = WorkLocationResolver::new(&repo)
        .resolve(&UserId::new("u1"), date("2025-06-03"))
        .unwrap();
    assert_eq!(decision.source, LocationSource::Default);
}

#[test]
fn test_policy_outside_range_is_ignored() {
    let repo: FakeRepository = FakeRepository::new()
        .with_user("u1", Role::Employee)
        .with_policy(date("2025-06-01"), date("2025-06-07"), WorkLocation::Wfh, true);
    let decision: LocationDecision = WorkLocationResolver::new(&repo)
        .resolve(&UserId::new("u1"), date("2025-06-08"))
        .unwrap();
    assert_eq!(decision.source, LocationSource::Default);
}

#[test]
fn test_repository_failure_propagates() {
    let repo: FakeRepository = FakeRepository::new();
    repo.fail_reads.set(true);
    let result: Result<LocationDecision, CoreError> =
        WorkLocationResolver::new(&repo).resolve(&UserId::new("u1"), date("2025-06-03"));
    assert!(matches!(result, Err(CoreError::Upstream(_))));
}

#[test]
fn test_location_source_wire_names() {
    assert_eq!(LocationSource::GlobalPolicy.as_str(), "global_policy");
    assert_eq!(LocationSource::Default.as_str(), "default");
}
