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

use crate::Result;
use crate::clock::{Clock, SystemClock};
use crate::config::ReaperConfig;
use crate::model::{ResourceDescriptor, ResourceKind, zone_from_path};
use crate::policy::{DEFAULT_AGE_THRESHOLD, DeletionPolicy, Verdict, name_filter};
use crate::stub::{ResourceDeletion, ResourceDirectory};
use chrono::TimeDelta;
use futures::TryStreamExt;

/// What a sweep did.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct SweepSummary {
    /// The kind of resources swept.
    pub kind: ResourceKind,

    /// The number of descriptors returned by the listing.
    pub examined: usize,

    /// The resources deleted, in deletion order.
    pub deleted: Vec<String>,

    /// The resources that were already gone at deletion time.
    pub not_found: Vec<String>,
}

impl SweepSummary {
    /// Creates an empty summary for `kind`.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            examined: 0,
            deleted: Vec::new(),
            not_found: Vec::new(),
        }
    }

    /// Sets the value of [examined][SweepSummary::examined].
    pub fn set_examined(mut self, v: usize) -> Self {
        self.examined = v;
        self
    }

    /// Sets the value of [deleted][SweepSummary::deleted].
    pub fn set_deleted<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.deleted = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the value of [not_found][SweepSummary::not_found].
    pub fn set_not_found<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.not_found = v.into_iter().map(Into::into).collect();
        self
    }
}

/// Removes stale test resources.
///
/// Each sweep lists one kind of resource, keeps the ones whose name contains
/// the prefix and that are older than the age threshold, and deletes them one
/// at a time. Sweeps hold no state between calls.
///
/// # Example
/// ```no_run
/// # use google_cloud_test_reaper::{Reaper, compute::ComputeClients};
/// # async fn sample() -> anyhow::Result<()> {
/// let clients = ComputeClients::new().await?;
/// let reaper = Reaper::new(clients.clone(), clients);
/// let summary = reaper
///     .reap_instance_templates("test-template-", "my-project")
///     .await?;
/// println!("deleted {:?}", summary.deleted);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Reaper<D, X, C = SystemClock> {
    directory: D,
    deletion: X,
    clock: C,
    age_threshold: TimeDelta,
}

impl<D, X> Reaper<D, X, SystemClock>
where
    D: ResourceDirectory,
    X: ResourceDeletion,
{
    /// Creates a reaper using the system clock and a 24 hour threshold.
    pub fn new(directory: D, deletion: X) -> Self {
        Self {
            directory,
            deletion,
            clock: SystemClock,
            age_threshold: DEFAULT_AGE_THRESHOLD,
        }
    }
}

impl<D, X, C> Reaper<D, X, C>
where
    D: ResourceDirectory,
    X: ResourceDeletion,
    C: Clock,
{
    /// Replaces the clock.
    pub fn with_clock<T: Clock>(self, clock: T) -> Reaper<D, X, T> {
        Reaper {
            directory: self.directory,
            deletion: self.deletion,
            clock,
            age_threshold: self.age_threshold,
        }
    }

    /// Changes the minimum age of deleted resources.
    ///
    /// Sweeps fail with a configuration error, before listing anything, if
    /// `v` is negative.
    pub fn with_age_threshold(mut self, v: TimeDelta) -> Self {
        self.age_threshold = v;
        self
    }

    /// Applies the settings in `config`.
    pub fn with_config(self, config: &ReaperConfig) -> Self {
        self.with_age_threshold(config.age_threshold)
    }

    /// Deletes stale instance templates whose name contains `name_prefix`.
    ///
    /// Any error, including not-found, stops the sweep.
    #[tracing::instrument(skip(self))]
    pub async fn reap_instance_templates(
        &self,
        name_prefix: &str,
        project: &str,
    ) -> Result<SweepSummary> {
        let policy = self.policy(name_prefix)?;
        let mut summary = SweepSummary::new(ResourceKind::InstanceTemplate);
        let mut items = self
            .directory
            .list_instance_templates(project, &name_filter(name_prefix));
        while let Some(template) = items.try_next().await? {
            summary.examined += 1;
            if !self.should_delete(&policy, &template)? {
                continue;
            }
            tracing::info!("deleting instance template {}", template.name);
            self.deletion
                .delete_instance_template(project, &template.name)
                .await?;
            summary.deleted.push(template.name);
        }
        Ok(summary)
    }

    /// Deletes stale, running VMs whose name contains `name_prefix`.
    ///
    /// The listing covers all zones. Each VM is deleted in its own zone,
    /// `zone` is used only when the listing does not say where the VM lives.
    /// Any error, including not-found, stops the sweep.
    #[tracing::instrument(skip(self))]
    pub async fn reap_instances(
        &self,
        name_prefix: &str,
        project: &str,
        zone: &str,
    ) -> Result<SweepSummary> {
        let policy = self.policy(name_prefix)?.with_require_running(true);
        let mut summary = SweepSummary::new(ResourceKind::Instance);
        let mut groups = self
            .directory
            .aggregated_list_instances(project, &name_filter(name_prefix));
        while let Some((group, instances)) = groups.try_next().await? {
            for instance in instances {
                summary.examined += 1;
                if !self.should_delete(&policy, &instance)? {
                    continue;
                }
                let target = instance
                    .location
                    .as_deref()
                    .and_then(zone_from_path)
                    .or_else(|| zone_from_path(&group))
                    .unwrap_or(zone);
                tracing::info!("deleting instance {} in zone {target}", instance.name);
                self.deletion
                    .delete_instance(project, target, &instance.name)
                    .await?;
                summary.deleted.push(instance.name);
            }
        }
        Ok(summary)
    }

    /// Deletes stale reservations in `zone` whose name contains
    /// `name_prefix`.
    ///
    /// Reservations removed by somebody else between the listing and the
    /// delete call are skipped. Other errors stop the sweep.
    #[tracing::instrument(skip(self))]
    pub async fn reap_reservations(
        &self,
        name_prefix: &str,
        project: &str,
        zone: &str,
    ) -> Result<SweepSummary> {
        let policy = self.policy(name_prefix)?;
        let mut summary = SweepSummary::new(ResourceKind::Reservation);
        let mut items = self.directory.list_reservations(project, zone);
        while let Some(reservation) = items.try_next().await? {
            summary.examined += 1;
            if !self.should_delete(&policy, &reservation)? {
                continue;
            }
            tracing::info!("deleting reservation {} in zone {zone}", reservation.name);
            match self
                .deletion
                .delete_reservation(project, zone, &reservation.name)
                .await
            {
                Ok(()) => summary.deleted.push(reservation.name),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(
                        "reservation {} not found, skipping deletion: {e}",
                        reservation.name
                    );
                    summary.not_found.push(reservation.name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }

    fn policy(&self, name_prefix: &str) -> Result<DeletionPolicy> {
        DeletionPolicy::new(name_prefix)?.with_age_threshold(self.age_threshold)
    }

    fn should_delete(&self, policy: &DeletionPolicy, item: &ResourceDescriptor) -> Result<bool> {
        match policy.evaluate(item, self.clock.now())? {
            Verdict::Delete => Ok(true),
            Verdict::Skip(reason) => {
                tracing::debug!("skipping {} {}: {reason:?}", item.kind, item.name);
                Ok(false)
            }
        }
    }
}
