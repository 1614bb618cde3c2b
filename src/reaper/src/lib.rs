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

//! Removes Compute Engine resources leaked by sample tests.
//!
//! Integration tests create VMs, instance templates, and reservations with
//! well-known name prefixes. When a test run is interrupted these resources
//! leak and consume quota. The [Reaper] finds the ones older than a threshold
//! (24 hours by default) and deletes them.
//!
//! The reaper uses two collaborators, defined in the [stub] module: a
//! [ResourceDirectory][stub::ResourceDirectory] to list resources, and a
//! [ResourceDeletion][stub::ResourceDeletion] to remove them.
//! [ComputeClients][compute::ComputeClients] implements both with the
//! Compute Engine client libraries.
//!
//! The crate also contains small helpers used by the same tests:
//! [keys::random_key_base64] and [zones::pick_random_zone].

pub mod clock;
pub mod compute;
pub mod config;
mod error;
pub mod keys;
pub mod model;
pub mod policy;
mod reaper;
pub mod stub;
pub mod zones;

pub use error::{Error, Result};
pub use reaper::{Reaper, SweepSummary};
