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

//! Implements the reaper collaborators with the Compute Engine client
//! libraries.

use crate::model::{InstanceStatus, ResourceDescriptor, ResourceKind, zone_from_path};
use crate::stub::{AggregatedStream, DescriptorStream, ResourceDeletion, ResourceDirectory};
use crate::{Error, Result};
use google_cloud_compute_v1::client::{
    Disks, InstanceTemplates, Instances, RegionDisks, Reservations,
};
use google_cloud_compute_v1::errors::OperationError;
use google_cloud_compute_v1::model::{
    Disk, Instance, InstanceTemplate, Operation, Reservation,
};
use google_cloud_gax::error::rpc::Code;
use google_cloud_gax::paginator::ItemPaginator;
use google_cloud_lro::Poller;

/// The Compute Engine clients used by the reaper.
///
/// The clients are created once and shared by all the sweeps. Cloning is
/// cheap, the clones share the underlying connections which are released
/// when the last clone is dropped.
#[derive(Clone, Debug)]
pub struct ComputeClients {
    instances: Instances,
    templates: InstanceTemplates,
    reservations: Reservations,
    disks: Disks,
    region_disks: RegionDisks,
}

impl ComputeClients {
    /// Creates the clients with the default configuration and credentials.
    pub async fn new() -> Result<Self> {
        let instances = Instances::builder().build().await.map_err(Error::transport)?;
        let templates = InstanceTemplates::builder()
            .build()
            .await
            .map_err(Error::transport)?;
        let reservations = Reservations::builder()
            .build()
            .await
            .map_err(Error::transport)?;
        let disks = Disks::builder().build().await.map_err(Error::transport)?;
        let region_disks = RegionDisks::builder()
            .build()
            .await
            .map_err(Error::transport)?;
        Ok(Self {
            instances,
            templates,
            reservations,
            disks,
            region_disks,
        })
    }

    /// Wraps clients created by the application.
    pub fn from_clients(
        instances: Instances,
        templates: InstanceTemplates,
        reservations: Reservations,
        disks: Disks,
        region_disks: RegionDisks,
    ) -> Self {
        Self {
            instances,
            templates,
            reservations,
            disks,
            region_disks,
        }
    }
}

impl ResourceDirectory for ComputeClients {
    fn list_instance_templates(&self, project: &str, filter: &str) -> DescriptorStream {
        let items = self
            .templates
            .list()
            .set_project(project)
            .set_filter(filter)
            .by_item();
        Box::pin(futures::stream::unfold(items, |mut items| async move {
            let item = items.next().await?;
            Some((item.map(template_descriptor).map_err(Error::transport), items))
        }))
    }

    fn aggregated_list_instances(&self, project: &str, filter: &str) -> AggregatedStream {
        let items = self
            .instances
            .aggregated_list()
            .set_project(project)
            .set_filter(filter)
            .set_return_partial_success(true)
            .by_item();
        Box::pin(futures::stream::unfold(items, |mut items| async move {
            let item = items.next().await?;
            let item = item
                .map(|(zone, scoped)| {
                    let instances = scoped
                        .instances
                        .into_iter()
                        .map(instance_descriptor)
                        .collect();
                    (zone, instances)
                })
                .map_err(Error::transport);
            Some((item, items))
        }))
    }

    fn list_reservations(&self, project: &str, zone: &str) -> DescriptorStream {
        let items = self
            .reservations
            .list()
            .set_project(project)
            .set_zone(zone)
            .by_item();
        Box::pin(futures::stream::unfold(items, |mut items| async move {
            let item = items.next().await?;
            Some((
                item.map(reservation_descriptor).map_err(Error::transport),
                items,
            ))
        }))
    }

    async fn get_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<ResourceDescriptor> {
        let instance = self
            .instances
            .get()
            .set_project(project)
            .set_zone(zone)
            .set_instance(name)
            .send()
            .await
            .map_err(|e| map_error(e, name))?;
        Ok(instance_descriptor(instance))
    }

    async fn get_disk(&self, project: &str, zone: &str, name: &str) -> Result<ResourceDescriptor> {
        let disk = self
            .disks
            .get()
            .set_project(project)
            .set_zone(zone)
            .set_disk(name)
            .send()
            .await
            .map_err(|e| map_error(e, name))?;
        Ok(disk_descriptor(disk))
    }

    async fn get_region_disk(
        &self,
        project: &str,
        region: &str,
        name: &str,
    ) -> Result<ResourceDescriptor> {
        let disk = self
            .region_disks
            .get()
            .set_project(project)
            .set_region(region)
            .set_disk(name)
            .send()
            .await
            .map_err(|e| map_error(e, name))?;
        Ok(disk_descriptor(disk))
    }
}

impl ResourceDeletion for ComputeClients {
    async fn delete_instance_template(&self, project: &str, name: &str) -> Result<()> {
        let operation = self
            .templates
            .delete()
            .set_project(project)
            .set_instance_template(name)
            .poller()
            .until_done()
            .await
            .map_err(|e| map_error(e, name))?;
        check_operation(operation, name)
    }

    async fn delete_instance(&self, project: &str, zone: &str, name: &str) -> Result<()> {
        let operation = self
            .instances
            .delete()
            .set_project(project)
            .set_zone(zone)
            .set_instance(name)
            .poller()
            .until_done()
            .await
            .map_err(|e| map_error(e, name))?;
        check_operation(operation, name)
    }

    async fn delete_reservation(&self, project: &str, zone: &str, name: &str) -> Result<()> {
        let operation = self
            .reservations
            .delete()
            .set_project(project)
            .set_zone(zone)
            .set_reservation(name)
            .poller()
            .until_done()
            .await
            .map_err(|e| map_error(e, name))?;
        check_operation(operation, name)
    }
}

fn template_descriptor(template: InstanceTemplate) -> ResourceDescriptor {
    ResourceDescriptor::new(
        ResourceKind::InstanceTemplate,
        template.name.unwrap_or_default(),
    )
    .set_or_clear_creation_timestamp(template.creation_timestamp)
}

fn instance_descriptor(instance: Instance) -> ResourceDescriptor {
    let status = instance
        .status
        .as_ref()
        .and_then(|s| s.name())
        .map(InstanceStatus::from_name);
    let location = instance.zone.as_deref().and_then(zone_from_path);
    ResourceDescriptor::new(ResourceKind::Instance, instance.name.unwrap_or_default())
        .set_or_clear_creation_timestamp(instance.creation_timestamp)
        .set_or_clear_status(status)
        .set_or_clear_location(location)
}

fn reservation_descriptor(reservation: Reservation) -> ResourceDescriptor {
    let location = reservation.zone.as_deref().and_then(zone_from_path);
    ResourceDescriptor::new(
        ResourceKind::Reservation,
        reservation.name.unwrap_or_default(),
    )
    .set_or_clear_creation_timestamp(reservation.creation_timestamp)
    .set_or_clear_location(location)
}

fn disk_descriptor(disk: Disk) -> ResourceDescriptor {
    let (kind, location) = match (disk.zone.as_deref(), disk.region.as_deref()) {
        (Some(zone), _) => (ResourceKind::Disk, zone_from_path(zone)),
        (None, Some(region)) => (ResourceKind::RegionDisk, zone_from_path(region)),
        (None, None) => (ResourceKind::Disk, None),
    };
    ResourceDescriptor::new(kind, disk.name.unwrap_or_default())
        .set_or_clear_creation_timestamp(disk.creation_timestamp)
        .set_or_clear_location(location)
}

fn map_error(error: google_cloud_gax::error::Error, name: &str) -> Error {
    if is_not_found(&error) {
        return Error::not_found(name);
    }
    Error::transport(error)
}

fn is_not_found(error: &google_cloud_gax::error::Error) -> bool {
    error.http_status_code() == Some(404)
        || error.status().is_some_and(|s| s.code == Code::NotFound)
}

fn check_operation(operation: Operation, name: &str) -> Result<()> {
    match operation.to_result() {
        Ok(_) => Ok(()),
        Err(OperationError::Generic(e)) if e.status_code == Some(404) => {
            Err(Error::not_found(name))
        }
        Err(e) => Err(Error::transport(e)),
    }
}
