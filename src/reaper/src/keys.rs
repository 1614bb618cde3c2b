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

//! Encryption keys for tests that create disks with customer-supplied keys.

use base64::{Engine, prelude::BASE64_STANDARD};
use rand::{Rng, distr::Alphanumeric};

/// The length of a customer-supplied encryption key, before encoding.
pub const KEY_LENGTH: usize = 32;

/// Generates a random customer-supplied encryption key for test disks.
///
/// The key has [KEY_LENGTH] characters from `[0-9A-Za-z]`, sampled with the
/// thread-local CSPRNG. The result is the standard base64 encoding, with
/// padding, of those ASCII bytes.
///
/// # Example
/// ```
/// # use google_cloud_test_reaper::keys::random_key_base64;
/// let key = random_key_base64();
/// assert_eq!(key.len(), 44);
/// ```
pub fn random_key_base64() -> String {
    let key: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect();
    BASE64_STANDARD.encode(key.as_bytes())
}
