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

//! The listing-time view of the resources a sweep inspects.

/// The kinds of resources the reaper knows how to remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A Compute Engine VM.
    Instance,
    /// A global instance template.
    InstanceTemplate,
    /// A zonal reservation.
    Reservation,
    /// A zonal persistent disk.
    Disk,
    /// A regional persistent disk.
    RegionDisk,
}

impl ResourceKind {
    /// The name used in logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::InstanceTemplate => "instance template",
            Self::Reservation => "reservation",
            Self::Disk => "disk",
            Self::RegionDisk => "regional disk",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The lifecycle state of a VM.
///
/// Values introduced by the service after this crate was written are
/// preserved in [InstanceStatus::Other].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Stopped,
    Suspending,
    Suspended,
    Repairing,
    Terminated,
    Other(String),
}

impl InstanceStatus {
    /// Parses the service representation, ignoring case.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_test_reaper::model::InstanceStatus;
    /// assert_eq!(InstanceStatus::from_name("running"), InstanceStatus::Running);
    /// assert_eq!(InstanceStatus::from_name("RUNNING"), InstanceStatus::Running);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PROVISIONING" => Self::Provisioning,
            "STAGING" => Self::Staging,
            "RUNNING" => Self::Running,
            "STOPPING" => Self::Stopping,
            "STOPPED" => Self::Stopped,
            "SUSPENDING" => Self::Suspending,
            "SUSPENDED" => Self::Suspended,
            "REPAIRING" => Self::Repairing,
            "TERMINATED" => Self::Terminated,
            _ => Self::Other(name.to_string()),
        }
    }

    /// The service representation of this status.
    pub fn name(&self) -> &str {
        match self {
            Self::Provisioning => "PROVISIONING",
            Self::Staging => "STAGING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Suspending => "SUSPENDING",
            Self::Suspended => "SUSPENDED",
            Self::Repairing => "REPAIRING",
            Self::Terminated => "TERMINATED",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A resource as returned by a listing call.
///
/// Descriptors are fetched on every sweep and never modified by the reaper.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ResourceDescriptor {
    /// The kind of resource.
    pub kind: ResourceKind,

    /// The resource name, unique within the listing scope.
    pub name: String,

    /// The creation time in RFC 3339 format, if the service reported one.
    pub creation_timestamp: Option<String>,

    /// The VM status. Only set for instances.
    pub status: Option<InstanceStatus>,

    /// The zone, or for regional disks the region, containing the resource,
    /// if known.
    pub location: Option<String>,
}

impl ResourceDescriptor {
    /// Create a new descriptor with only the name set.
    pub fn new<T: Into<String>>(kind: ResourceKind, name: T) -> Self {
        Self {
            kind,
            name: name.into(),
            creation_timestamp: None,
            status: None,
            location: None,
        }
    }

    /// Sets the value of [creation_timestamp][ResourceDescriptor::creation_timestamp].
    ///
    /// # Example
    /// ```
    /// # use google_cloud_test_reaper::model::{ResourceDescriptor, ResourceKind};
    /// let d = ResourceDescriptor::new(ResourceKind::Reservation, "r-1")
    ///     .set_creation_timestamp("2025-01-01T00:00:00.000-08:00");
    /// assert!(d.creation_timestamp.is_some());
    /// ```
    pub fn set_creation_timestamp<T: Into<String>>(mut self, v: T) -> Self {
        self.creation_timestamp = Some(v.into());
        self
    }

    /// Sets or clears the value of [creation_timestamp][ResourceDescriptor::creation_timestamp].
    pub fn set_or_clear_creation_timestamp<T: Into<String>>(mut self, v: Option<T>) -> Self {
        self.creation_timestamp = v.map(Into::into);
        self
    }

    /// Sets the value of [status][ResourceDescriptor::status].
    pub fn set_status(mut self, v: InstanceStatus) -> Self {
        self.status = Some(v);
        self
    }

    /// Sets or clears the value of [status][ResourceDescriptor::status].
    pub fn set_or_clear_status(mut self, v: Option<InstanceStatus>) -> Self {
        self.status = v;
        self
    }

    /// Sets the value of [location][ResourceDescriptor::location].
    pub fn set_location<T: Into<String>>(mut self, v: T) -> Self {
        self.location = Some(v.into());
        self
    }

    /// Sets or clears the value of [location][ResourceDescriptor::location].
    pub fn set_or_clear_location<T: Into<String>>(mut self, v: Option<T>) -> Self {
        self.location = v.map(Into::into);
        self
    }

    /// Returns true if the listing populated enough of the descriptor to act
    /// on it.
    pub fn is_initialized(&self) -> bool {
        !self.name.is_empty()
    }

    /// Returns true if the VM is running.
    pub fn is_running(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| *s == InstanceStatus::Running)
    }
}

/// Returns the last segment of a zone URL or resource path.
///
/// Region URLs have the same shape and work too. The service reports zones
/// as full URLs, such as
/// `https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a`,
/// and aggregated listings key their results by `zones/us-central1-a`.
///
/// # Example
/// ```
/// # use google_cloud_test_reaper::model::zone_from_path;
/// assert_eq!(zone_from_path("zones/us-central1-a"), Some("us-central1-a"));
/// assert_eq!(zone_from_path("us-central1-a"), Some("us-central1-a"));
/// assert_eq!(zone_from_path(""), None);
/// ```
pub fn zone_from_path(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|z| !z.is_empty())
}
