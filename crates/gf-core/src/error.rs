// Copyright 2025 the gf-sdk authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core error type and the per-context last-error record.

use std::error::Error;
use std::fmt;

use crate::status::Status;

/// Convenient result alias for core operations.
pub type GfResult<T> = Result<T, GfError>;

/// Errors raised by the core analytics types.
#[derive(Debug, Clone, PartialEq)]
pub enum GfError {
    /// A configuration field failed validation.
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// Metrics were requested from a context holding no samples.
    EmptyWindow,
    /// The requested window capacity exceeds the supported bound.
    CapacityTooLarge {
        /// Capacity the configuration asked for.
        requested: usize,
        /// The supported maximum.
        max: usize,
    },
    /// A tuning update failed validation.
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl GfError {
    /// The packed status corresponding to this error.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidConfig { .. } => Status::CONFIG_INVALID,
            Self::EmptyWindow => Status::ENGINE_EMPTY,
            Self::CapacityTooLarge { .. } => Status::CAPACITY_LIMIT,
            Self::InvalidTuning { .. } => Status::TUNING_RANGE,
        }
    }
}

impl fmt::Display for GfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration: {field}: {reason}")
            }
            Self::EmptyWindow => {
                write!(f, "No samples have been ingested yet")
            }
            Self::CapacityTooLarge { requested, max } => {
                write!(f, "Window capacity {requested} exceeds the supported maximum {max}")
            }
            Self::InvalidTuning { field, reason } => {
                write!(f, "Invalid tuning: {field}: {reason}")
            }
        }
    }
}

impl Error for GfError {}

/// Diagnostic record of the most recent failure inside a context.
///
/// Populated before the operation returns its `Err`, so a caller that
/// discards the error value can still retrieve where and why the last
/// call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    /// Packed status of the failure.
    pub status: Status,
    /// Free-form numeric detail; which quantity it carries depends on
    /// the failure (sample counts, offending values).
    pub detail: i64,
    /// Source line that raised the failure.
    pub line: u32,
    /// Short tag naming the raising component.
    pub origin: &'static str,
}

impl fmt::Display for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) at {}:{} detail={}",
            self.status.name(),
            self.status.describe().message,
            self.origin,
            self.line,
            self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_their_statuses() {
        assert_eq!(GfError::EmptyWindow.status(), Status::ENGINE_EMPTY);
        let config_err = GfError::InvalidConfig {
            field: "target_fps",
            reason: "0 is outside 1..=1000".to_string(),
        };
        assert_eq!(config_err.status(), Status::CONFIG_INVALID);
    }

    #[test]
    fn display_carries_the_field_name() {
        let err = GfError::InvalidTuning {
            field: "drop_fps",
            reason: "120 is outside 1..=target_fps (60)".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("drop_fps"), "missing field in: {text}");
    }

    #[test]
    fn last_error_formats_its_origin() {
        let record = LastError {
            status: Status::ENGINE_EMPTY,
            detail: 0,
            line: 42,
            origin: "gf_ctx",
        };
        let text = record.to_string();
        assert!(text.contains("ENGINE_EMPTY"));
        assert!(text.contains("gf_ctx:42"));
    }
}
