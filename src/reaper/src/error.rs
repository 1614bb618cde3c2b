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

//! Errors returned by the reaper and its collaborators.

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result type for sweeps and collaborator calls.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the reaper.
///
/// Callers inspect the error with the `is_*()` predicates. Only the
/// reservation sweep treats [is_not_found][Error::is_not_found] as
/// recoverable, all other sweeps surface every error unchanged.
///
/// Collaborator implementations, including mocks in tests, create instances
/// with [Error::transport] and [Error::not_found].
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// A listing or deletion call failed to complete.
    pub fn is_transport(&self) -> bool {
        matches!(self.0, ErrorKind::Transport(_))
    }

    /// The resource was already gone when the delete call reached the
    /// service.
    pub fn is_not_found(&self) -> bool {
        matches!(self.0, ErrorKind::NotFound(_))
    }

    /// A creation timestamp could not be parsed.
    pub fn is_malformed_timestamp(&self) -> bool {
        matches!(self.0, ErrorKind::MalformedTimestamp { .. })
    }

    /// The reaper configuration is invalid.
    pub fn is_config(&self) -> bool {
        matches!(self.0, ErrorKind::Config(_))
    }

    /// Create an error representing a failed RPC, including failed
    /// long-running operations.
    pub fn transport<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Transport(source.into()))
    }

    /// Create an error representing a delete call for a resource that no
    /// longer exists.
    pub fn not_found<T>(name: T) -> Error
    where
        T: Into<String>,
    {
        Error(ErrorKind::NotFound(name.into()))
    }

    pub(crate) fn malformed_timestamp(value: &str, source: chrono::ParseError) -> Error {
        Error(ErrorKind::MalformedTimestamp {
            value: value.to_string(),
            source,
        })
    }

    pub(crate) fn config<T>(message: T) -> Error
    where
        T: Into<String>,
    {
        Error(ErrorKind::Config(message.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("the request failed: {0}")]
    Transport(#[source] BoxError),
    #[error("resource {0} not found")]
    NotFound(String),
    #[error("cannot parse creation timestamp {value:?}: {source}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid reaper configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn constructors() {
        let error = Error::transport("test message");
        assert!(error.is_transport(), "{error:?}");
        assert!(!error.is_not_found(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(error.to_string().contains("test message"), "{error}");

        let error = Error::not_found("test-resource");
        assert!(error.is_not_found(), "{error:?}");
        assert!(!error.is_transport(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");
        assert!(error.to_string().contains("test-resource"), "{error}");

        let parse = chrono::DateTime::parse_from_rfc3339("not-a-date").unwrap_err();
        let error = Error::malformed_timestamp("not-a-date", parse);
        assert!(error.is_malformed_timestamp(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(error.to_string().contains("not-a-date"), "{error}");

        let error = Error::config("empty prefix");
        assert!(error.is_config(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");
        assert!(error.to_string().contains("empty prefix"), "{error}");
    }
}
