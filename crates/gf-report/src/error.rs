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

//! Error type of the persistence and reporting layer.

use gf_core::error::GfError;
use gf_core::status::Status;
use thiserror::Error;

/// Convenience alias for persistence and reporting results.
pub type ReportResult<T> = Result<T, ReportError>;

/// Failures of session files and report generation.
///
/// Structural damage to a `.gfs` container is kept apart from plain I/O
/// so a caller can tell a truncated download from a missing file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A `.gfs` file failed its structural or integrity checks.
    #[error("session file corrupt: {reason}")]
    Corrupt {
        /// Which check failed.
        reason: String,
    },

    /// The session decoded cleanly but cannot rebuild a context, for
    /// example because its embedded configuration no longer validates.
    #[error("session replay failed: {0}")]
    Replay(#[from] GfError),

    /// A `.gfs` file could not be read or written.
    #[error("session file I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON report could not be written.
    #[error("report write: {0}")]
    ReportWrite(#[source] std::io::Error),

    /// The report could not be encoded as JSON.
    #[error("report encoding: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// The packed status corresponding to this error.
    ///
    /// Replay failures pass the underlying status through; it pinpoints
    /// the offending field better than a blanket corruption code would.
    pub fn status(&self) -> Status {
        match self {
            Self::Corrupt { .. } => Status::SESSION_CORRUPT,
            Self::Replay(inner) => inner.status(),
            Self::Io(_) => Status::SESSION_IO,
            Self::ReportWrite(_) | Self::Json(_) => Status::REPORT_IO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_errors_map_to_the_session_module() {
        let corrupt = ReportError::Corrupt {
            reason: "payload hash mismatch".to_string(),
        };
        assert_eq!(corrupt.status(), Status::SESSION_CORRUPT);

        let io = ReportError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(io.status(), Status::SESSION_IO);
    }

    #[test]
    fn test_replay_errors_keep_their_precise_status() {
        let replay = ReportError::Replay(GfError::EmptyWindow);
        assert_eq!(replay.status(), Status::ENGINE_EMPTY);
    }

    #[test]
    fn test_report_write_maps_to_the_analyzer_module() {
        let write =
            ReportError::ReportWrite(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(write.status(), Status::REPORT_IO);
    }
}
