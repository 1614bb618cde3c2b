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

//! Reaper configuration, resolved once at startup.

use crate::policy::DEFAULT_AGE_THRESHOLD;
use crate::zones::{DEFAULT_ZONES, TEST_ZONES_VAR, env_or_default, parse_zones, pick_zone};
use chrono::TimeDelta;

/// The environment variable with the default project.
pub const PROJECT_VAR: &str = "GOOGLE_CLOUD_PROJECT";

/// Settings shared by all the sweeps in a process.
///
/// Build it with [ReaperConfig::from_env] in binaries, or
/// [ReaperConfig::from_lookup] when the values come from somewhere else.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ReaperConfig {
    /// The zones where tests create resources.
    pub zones: Vec<String>,

    /// Resources younger than this are kept.
    pub age_threshold: TimeDelta,

    /// The project to clean up, if configured.
    pub project_id: Option<String>,
}

impl ReaperConfig {
    /// Reads the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let zones = parse_zones(&env_or_default(&lookup, TEST_ZONES_VAR, DEFAULT_ZONES));
        let project_id = lookup(PROJECT_VAR).filter(|v| !v.trim().is_empty());
        Self {
            zones,
            age_threshold: DEFAULT_AGE_THRESHOLD,
            project_id,
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Sets the value of [age_threshold][ReaperConfig::age_threshold].
    ///
    /// Sweeps reject negative thresholds with a configuration error.
    pub fn set_age_threshold(mut self, v: TimeDelta) -> Self {
        self.age_threshold = v;
        self
    }

    /// Sets the value of [project_id][ReaperConfig::project_id].
    pub fn set_project_id<T: Into<String>>(mut self, v: T) -> Self {
        self.project_id = Some(v.into());
        self
    }

    /// Returns one of the configured zones at random.
    pub fn random_zone(&self) -> String {
        pick_zone(&self.zones)
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scoped_env::ScopedEnv;
    use serial_test::serial;

    #[test]
    fn defaults() {
        let config = ReaperConfig::default();
        assert_eq!(
            config.zones,
            vec!["us-central1-a", "us-west1-a", "asia-south1-a"]
        );
        assert_eq!(config.age_threshold, TimeDelta::hours(24));
        assert_eq!(config.project_id, None);
        assert!(config.zones.contains(&config.random_zone()));
    }

    #[test]
    fn lookup() {
        let config = ReaperConfig::from_lookup(|name| match name {
            TEST_ZONES_VAR => Some("europe-west4-a, europe-west4-b".to_string()),
            PROJECT_VAR => Some("my-project".to_string()),
            _ => None,
        });
        assert_eq!(config.zones, vec!["europe-west4-a", "europe-west4-b"]);
        assert_eq!(config.project_id.as_deref(), Some("my-project"));
    }

    #[test]
    fn setters() {
        let config = ReaperConfig::default()
            .set_age_threshold(TimeDelta::hours(48))
            .set_project_id("p");
        assert_eq!(config.age_threshold, TimeDelta::hours(48));
        assert_eq!(config.project_id.as_deref(), Some("p"));
    }

    #[test]
    fn no_zones() {
        let config = ReaperConfig::from_lookup(|_| Some(",".to_string()));
        assert!(config.zones.is_empty(), "{config:?}");
        assert_eq!(config.random_zone(), crate::zones::UNKNOWN_ZONE);
    }

    #[serial]
    #[test]
    fn from_env() {
        let _zones = ScopedEnv::set(TEST_ZONES_VAR, "a,b,c");
        let _project = ScopedEnv::remove(PROJECT_VAR);
        let config = ReaperConfig::from_env();
        assert_eq!(config.zones, vec!["a", "b", "c"]);
        assert_eq!(config.project_id, None);

        let _project = ScopedEnv::set(PROJECT_VAR, "abc");
        let config = ReaperConfig::from_env();
        assert_eq!(config.project_id.as_deref(), Some("abc"));
    }

    #[serial]
    #[test]
    fn from_env_blank() {
        let _zones = ScopedEnv::set(TEST_ZONES_VAR, "  ");
        let _project = ScopedEnv::set(PROJECT_VAR, "");
        let config = ReaperConfig::from_env();
        assert_eq!(config, ReaperConfig::default());
    }
}
