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

//! Helpers to spread test resources across zones.

use rand::seq::IndexedRandom;

/// The environment variable listing the zones used by the tests.
pub const TEST_ZONES_VAR: &str = "TEST_ZONES";

/// The zones used when [TEST_ZONES_VAR] is unset or blank.
pub const DEFAULT_ZONES: &str = "us-central1-a,us-west1-a,asia-south1-a";

/// Returned by [pick_zone] when there is nothing to choose from.
pub const UNKNOWN_ZONE: &str = "unknown";

/// Splits a comma-separated list of zones.
///
/// Entries are trimmed and empty entries are dropped.
///
/// # Example
/// ```
/// # use google_cloud_test_reaper::zones::parse_zones;
/// assert_eq!(parse_zones(" a, b ,,c"), vec!["a", "b", "c"]);
/// assert!(parse_zones(" , ").is_empty());
/// ```
pub fn parse_zones(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns one of `zones` chosen uniformly at random, or [UNKNOWN_ZONE].
pub fn pick_zone(zones: &[String]) -> String {
    zones
        .choose(&mut rand::rng())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_ZONE.to_string())
}

/// Reads `var` through `lookup` and picks one of the zones it lists.
///
/// When the variable is unset or blank the zones in `default` are used
/// instead. The lookup is injected so callers can use something other than
/// the process environment, and so tests do not need to modify it.
///
/// # Example
/// ```
/// # use google_cloud_test_reaper::zones::{pick_random_zone, TEST_ZONES_VAR};
/// let zone = pick_random_zone(|_| Some("a,b".to_string()), TEST_ZONES_VAR, "c");
/// assert!(zone == "a" || zone == "b", "{zone}");
/// ```
pub fn pick_random_zone<F>(lookup: F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let list = env_or_default(lookup, var, default);
    pick_zone(&parse_zones(&list))
}

/// Returns the value of `var`, or `default` if it is unset or blank.
pub fn env_or_default<F>(lookup: F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
