//! Location fixes and sources.
//!
//! The core never talks to a positioning API itself. The platform side
//! acquires fixes and reports them into the session; `LocationSource`
//! is the synchronous form of that contract used by simulated feeds
//! and tests.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoPoint;

/// A single reported location sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub point: GeoPoint,
    /// Estimated error radius in meters, if the source reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    /// Sample time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl Fix {
    pub fn new(point: GeoPoint, timestamp_ms: u64) -> Self {
        Self {
            point,
            accuracy_m: None,
            timestamp_ms,
        }
    }
}

/// Options passed through to the positioning collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    /// Oldest cached position the collaborator may hand back.
    pub maximum_age_ms: u32,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 60_000,
        }
    }
}

/// Why a location request produced no fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    /// The environment has no positioning capability at all. There is
    /// no retry path for this one.
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("location unavailable")]
    Unavailable,
}

impl LocationError {
    /// Stable identifier used across the bridge.
    pub fn kind(self) -> &'static str {
        match self {
            LocationError::Unsupported => "unsupported",
            LocationError::PermissionDenied => "permission_denied",
            LocationError::Timeout => "timeout",
            LocationError::Unavailable => "unavailable",
        }
    }

    /// Parse the identifier form. Unknown strings map to `Unavailable`.
    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "unsupported" => LocationError::Unsupported,
            "permission_denied" => LocationError::PermissionDenied,
            "timeout" => LocationError::Timeout,
            _ => LocationError::Unavailable,
        }
    }
}

/// A source of location fixes.
///
/// One call per request; the session decides when to ask again.
pub trait LocationSource {
    fn request_fix(&mut self, options: &FixOptions) -> Result<Fix, LocationError>;
}

/// Replays a fixed sequence of results, then fails with `Unavailable`.
///
/// Stands in for the device GPS in simulations and tests.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Fix, LocationError>>,
    requests: usize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<Fix, LocationError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            requests: 0,
        }
    }

    /// Number of requests made so far.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl LocationSource for ScriptedSource {
    fn request_fix(&mut self, _options: &FixOptions) -> Result<Fix, LocationError> {
        self.requests += 1;
        self.script
            .pop_front()
            .unwrap_or(Err(LocationError::Unavailable))
    }
}
