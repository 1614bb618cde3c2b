// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Decides which listed resources a sweep deletes.

use crate::error::{Error, Result};
use crate::model::ResourceDescriptor;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

/// Resources younger than this are never deleted.
pub const DEFAULT_AGE_THRESHOLD: TimeDelta = TimeDelta::hours(24);

/// Parses a creation timestamp as reported by Compute Engine.
///
/// The service uses RFC 3339 with a UTC offset, for example
/// `2025-03-04T10:11:12.345-08:00`.
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(timestamp).map_err(|e| Error::malformed_timestamp(timestamp, e))
}

/// Returns true if `timestamp` is strictly older than `now - threshold`.
///
/// A deadline before the earliest representable time makes nothing stale.
///
/// # Example
/// ```
/// # use google_cloud_test_reaper::policy::{is_stale, DEFAULT_AGE_THRESHOLD};
/// # use chrono::{TimeZone, Utc};
/// let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
/// assert!(is_stale("2024-12-31T23:00:00Z", now, DEFAULT_AGE_THRESHOLD)?);
/// assert!(!is_stale("2025-01-01T23:00:00Z", now, DEFAULT_AGE_THRESHOLD)?);
/// # Ok::<(), google_cloud_test_reaper::Error>(())
/// ```
pub fn is_stale(timestamp: &str, now: DateTime<Utc>, threshold: TimeDelta) -> Result<bool> {
    let created = parse_timestamp(timestamp)?;
    Ok(now
        .checked_sub_signed(threshold)
        .is_some_and(|deadline| created < deadline))
}

/// Rejects negative age thresholds.
///
/// With a negative threshold the deadline moves into the future and every
/// resource would look stale.
pub fn check_age_threshold(threshold: TimeDelta) -> Result<TimeDelta> {
    if threshold < TimeDelta::zero() {
        return Err(Error::config(format!(
            "the age threshold must not be negative, got {threshold}"
        )));
    }
    Ok(threshold)
}

/// The server-side filter for names containing `prefix`.
pub fn name_filter(prefix: &str) -> String {
    format!("name:{prefix}")
}

/// Why a descriptor was left alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingTimestamp,
    NameMismatch,
    TooRecent,
    NotRunning,
    Uninitialized,
}

/// The outcome of evaluating one descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Delete,
    Skip(SkipReason),
}

/// The rules a sweep applies to each listed resource.
#[derive(Clone, Debug)]
pub struct DeletionPolicy {
    name_prefix: String,
    age_threshold: TimeDelta,
    require_running: bool,
}

impl DeletionPolicy {
    /// Creates a policy matching names that contain `name_prefix`.
    ///
    /// An empty prefix would match every resource in the project and is
    /// rejected.
    pub fn new<T: Into<String>>(name_prefix: T) -> Result<Self> {
        let name_prefix = name_prefix.into();
        if name_prefix.is_empty() {
            return Err(Error::config("the name prefix must not be empty"));
        }
        Ok(Self {
            name_prefix,
            age_threshold: DEFAULT_AGE_THRESHOLD,
            require_running: false,
        })
    }

    /// Changes the minimum age for deletion.
    ///
    /// Fails with a configuration error if `v` is negative.
    pub fn with_age_threshold(mut self, v: TimeDelta) -> Result<Self> {
        self.age_threshold = check_age_threshold(v)?;
        Ok(self)
    }

    /// Only delete resources whose status is `RUNNING`.
    pub fn with_require_running(mut self, v: bool) -> Self {
        self.require_running = v;
        self
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn age_threshold(&self) -> TimeDelta {
        self.age_threshold
    }

    /// Applies the checks in order: timestamp present, name present, name
    /// match, age, then status.
    ///
    /// Malformed timestamps are errors, missing timestamps are not.
    pub fn evaluate(
        &self,
        descriptor: &ResourceDescriptor,
        now: DateTime<Utc>,
    ) -> Result<Verdict> {
        let Some(timestamp) = descriptor.creation_timestamp.as_deref() else {
            return Ok(Verdict::Skip(SkipReason::MissingTimestamp));
        };
        if !descriptor.is_initialized() {
            return Ok(Verdict::Skip(SkipReason::Uninitialized));
        }
        if !descriptor.name.contains(&self.name_prefix) {
            return Ok(Verdict::Skip(SkipReason::NameMismatch));
        }
        if !is_stale(timestamp, now, self.age_threshold)? {
            return Ok(Verdict::Skip(SkipReason::TooRecent));
        }
        if self.require_running && !descriptor.is_running() {
            return Ok(Verdict::Skip(SkipReason::NotRunning));
        }
        Ok(Verdict::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceStatus, ResourceKind};
    use chrono::{SecondsFormat, TimeZone};
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> String {
        (now() - delta).to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    #[test]
    fn staleness_boundary() -> anyhow::Result<()> {
        let threshold = DEFAULT_AGE_THRESHOLD;
        let older = ago(threshold + TimeDelta::seconds(1));
        assert!(is_stale(&older, now(), threshold)?, "{older}");
        let newer = ago(threshold - TimeDelta::seconds(1));
        assert!(!is_stale(&newer, now(), threshold)?, "{newer}");
        let exact = ago(threshold);
        assert!(!is_stale(&exact, now(), threshold)?, "{exact}");
        Ok(())
    }

    #[test_case("2025-05-30T04:00:00.000-08:00", true)]
    #[test_case("2025-05-31T11:59:59+00:00", true)]
    #[test_case("2025-05-31T12:00:01Z", false)]
    #[test_case("2025-06-01T09:00:00+05:30", false)]
    fn offsets(timestamp: &str, want: bool) -> anyhow::Result<()> {
        assert_eq!(is_stale(timestamp, now(), DEFAULT_AGE_THRESHOLD)?, want);
        Ok(())
    }

    #[test_case("")]
    #[test_case("yesterday")]
    #[test_case("2025-05-30")]
    #[test_case("2025-05-30T04:00:00")]
    fn malformed(timestamp: &str) {
        let got = is_stale(timestamp, now(), DEFAULT_AGE_THRESHOLD);
        assert!(
            got.as_ref().is_err_and(|e| e.is_malformed_timestamp()),
            "{got:?}"
        );
    }

    #[test]
    fn filter() {
        assert_eq!(name_filter("test-vm-"), "name:test-vm-");
    }

    #[test]
    fn empty_prefix() {
        let got = DeletionPolicy::new("");
        assert!(got.as_ref().is_err_and(|e| e.is_config()), "{got:?}");
    }

    #[test]
    fn accessors() -> anyhow::Result<()> {
        let policy = DeletionPolicy::new("abc")?.with_age_threshold(TimeDelta::hours(2))?;
        assert_eq!(policy.name_prefix(), "abc");
        assert_eq!(policy.age_threshold(), TimeDelta::hours(2));
        Ok(())
    }

    #[test]
    fn negative_threshold() -> anyhow::Result<()> {
        let got = DeletionPolicy::new("abc")?.with_age_threshold(TimeDelta::hours(-1));
        assert!(got.as_ref().is_err_and(|e| e.is_config()), "{got:?}");
        let got = check_age_threshold(TimeDelta::seconds(-1));
        assert!(got.as_ref().is_err_and(|e| e.is_config()), "{got:?}");
        assert_eq!(check_age_threshold(TimeDelta::zero())?, TimeDelta::zero());
        Ok(())
    }

    #[test]
    fn huge_threshold() -> anyhow::Result<()> {
        // The deadline underflows, nothing is old enough.
        assert!(!is_stale("1970-01-01T00:00:00Z", now(), TimeDelta::MAX)?);
        let policy = DeletionPolicy::new("r-")?.with_age_threshold(TimeDelta::MAX)?;
        let d = ResourceDescriptor::new(ResourceKind::Reservation, "r-1")
            .set_creation_timestamp("1970-01-01T00:00:00Z");
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::TooRecent)
        );
        Ok(())
    }

    #[test]
    fn evaluate_uninitialized() -> anyhow::Result<()> {
        let policy = DeletionPolicy::new("r-")?;
        let d = ResourceDescriptor::new(ResourceKind::Reservation, "")
            .set_creation_timestamp(ago(TimeDelta::hours(30)));
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::Uninitialized)
        );
        // Checked before the timestamp is parsed.
        let d = d.set_creation_timestamp("not a timestamp");
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::Uninitialized)
        );
        Ok(())
    }

    #[test]
    fn evaluate_template() -> anyhow::Result<()> {
        let policy = DeletionPolicy::new("tmpl-")?;
        let stale = ago(TimeDelta::hours(30));
        let recent = ago(TimeDelta::hours(1));
        let kind = ResourceKind::InstanceTemplate;

        let d = ResourceDescriptor::new(kind, "tmpl-1");
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::MissingTimestamp)
        );
        let d = ResourceDescriptor::new(kind, "other-1").set_creation_timestamp(&stale);
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::NameMismatch)
        );
        let d = ResourceDescriptor::new(kind, "tmpl-1").set_creation_timestamp(&recent);
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::TooRecent)
        );
        let d = ResourceDescriptor::new(kind, "a-tmpl-1").set_creation_timestamp(&stale);
        assert_eq!(policy.evaluate(&d, now())?, Verdict::Delete);
        Ok(())
    }

    #[test]
    fn evaluate_instance() -> anyhow::Result<()> {
        let policy = DeletionPolicy::new("vm-")?.with_require_running(true);
        let stale = ago(TimeDelta::hours(25));
        let d = ResourceDescriptor::new(ResourceKind::Instance, "vm-1")
            .set_creation_timestamp(&stale)
            .set_status(InstanceStatus::Terminated);
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::NotRunning)
        );
        let d = d.set_or_clear_status(None);
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::NotRunning)
        );
        let d = d.set_status(InstanceStatus::Running);
        assert_eq!(policy.evaluate(&d, now())?, Verdict::Delete);
        Ok(())
    }

    #[test]
    fn evaluate_malformed() -> anyhow::Result<()> {
        let policy = DeletionPolicy::new("r-")?;
        let d = ResourceDescriptor::new(ResourceKind::Reservation, "r-1")
            .set_creation_timestamp("not a timestamp");
        let got = policy.evaluate(&d, now());
        assert!(
            got.as_ref().is_err_and(|e| e.is_malformed_timestamp()),
            "{got:?}"
        );

        // Name checks run before parsing.
        let d = ResourceDescriptor::new(ResourceKind::Reservation, "other")
            .set_creation_timestamp("not a timestamp");
        assert_eq!(
            policy.evaluate(&d, now())?,
            Verdict::Skip(SkipReason::NameMismatch)
        );
        Ok(())
    }
}
