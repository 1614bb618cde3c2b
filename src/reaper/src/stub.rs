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

//! Traits to mock the services used by the reaper.
//!
//! The reaper never talks to Compute Engine directly. It lists resources
//! through a [ResourceDirectory] and removes them through a
//! [ResourceDeletion]. [ComputeClients][crate::compute::ComputeClients]
//! implements both traits with the Compute Engine client libraries. Tests
//! provide in-memory or mock implementations.
//!
//! Pagination, retries, and long-running operation polling are the
//! responsibility of the implementation.

use crate::Result;
use crate::model::ResourceDescriptor;
use futures::stream::BoxStream;

/// A lazy, paginated sequence of descriptors.
///
/// Each item may require a network round-trip. Errors are reported in-band,
/// the sweep stops on the first one.
pub type DescriptorStream = BoxStream<'static, Result<ResourceDescriptor>>;

/// A lazy sequence of `(zone group key, descriptors)` pairs, as returned by
/// aggregated listings.
pub type AggregatedStream = BoxStream<'static, Result<(String, Vec<ResourceDescriptor>)>>;

/// Lists the resources in a project.
pub trait ResourceDirectory: std::fmt::Debug + Send + Sync {
    /// Lists the instance templates in `project` matching `filter`.
    ///
    /// Calling this again starts a fresh query.
    fn list_instance_templates(&self, project: &str, filter: &str) -> DescriptorStream;

    /// Lists the VMs in all the zones of `project` matching `filter`.
    fn aggregated_list_instances(&self, project: &str, filter: &str) -> AggregatedStream;

    /// Lists the reservations in `zone`.
    fn list_reservations(&self, project: &str, zone: &str) -> DescriptorStream;

    /// Fetches a single VM.
    fn get_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> impl Future<Output = Result<ResourceDescriptor>> + Send;

    /// Fetches a single zonal disk.
    fn get_disk(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> impl Future<Output = Result<ResourceDescriptor>> + Send;

    /// Fetches a single regional disk.
    fn get_region_disk(
        &self,
        project: &str,
        region: &str,
        name: &str,
    ) -> impl Future<Output = Result<ResourceDescriptor>> + Send;
}

/// Deletes resources.
///
/// Each call returns once the deletion completes. Implementations return
/// [Error::not_found][crate::Error::not_found] if the resource does not
/// exist.
pub trait ResourceDeletion: std::fmt::Debug + Send + Sync {
    fn delete_instance_template(
        &self,
        project: &str,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_reservation(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Returns the status of a VM, as reported by the service.
pub async fn instance_status<D>(
    directory: &D,
    project: &str,
    zone: &str,
    name: &str,
) -> Result<Option<crate::model::InstanceStatus>>
where
    D: ResourceDirectory,
{
    let instance = directory.get_instance(project, zone, name).await?;
    Ok(instance.status)
}
