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

//! Reading and writing `.gfs` session files.
//!
//! A session file is a [`SessionHeader`] followed by the snapshot as a
//! bincode payload. Reading verifies the magic, the version, the
//! declared length and the payload hash before decoding, so every way a
//! file can rot maps to a [`ReportError::Corrupt`] naming the failed
//! check rather than a decode panic deeper in.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{ReportError, ReportResult};
use crate::format::SessionHeader;
use gf_metrics::session::SessionSnapshot;

/// Persists `snapshot` at `path` as a `.gfs` container.
pub fn write_session(snapshot: &SessionSnapshot, path: &Path) -> ReportResult<()> {
    let payload = bincode::encode_to_vec(snapshot, bincode::config::standard()).map_err(|e| {
        ReportError::Corrupt {
            reason: format!("payload encoding failed: {e}"),
        }
    })?;
    let header = SessionHeader::for_payload(&payload);

    let mut bytes = Vec::with_capacity(SessionHeader::SIZE + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&payload);
    fs::write(path, bytes)?;

    info!(
        "wrote session {} ({} rows, {} frames total)",
        path.display(),
        snapshot.rows.len(),
        snapshot.frames_total
    );
    Ok(())
}

/// Reads and verifies the session stored at `path`.
pub fn read_session(path: &Path) -> ReportResult<SessionSnapshot> {
    let bytes = fs::read(path)?;

    let header = SessionHeader::from_bytes(&bytes).map_err(|reason| ReportError::Corrupt {
        reason: reason.to_string(),
    })?;
    if header.format_version != SessionHeader::VERSION {
        return Err(ReportError::Corrupt {
            reason: format!(
                "unsupported format version {} (expected {})",
                header.format_version,
                SessionHeader::VERSION
            ),
        });
    }

    let payload = &bytes[SessionHeader::SIZE..];
    if payload.len() as u64 != header.payload_length {
        return Err(ReportError::Corrupt {
            reason: format!(
                "payload length mismatch: header declares {}, file holds {}",
                header.payload_length,
                payload.len()
            ),
        });
    }
    if *blake3::hash(payload).as_bytes() != header.payload_hash {
        return Err(ReportError::Corrupt {
            reason: "payload hash mismatch".to_string(),
        });
    }

    let (snapshot, _): (SessionSnapshot, usize) =
        bincode::decode_from_slice(payload, bincode::config::standard()).map_err(|e| {
            ReportError::Corrupt {
                reason: format!("payload decoding failed: {e}"),
            }
        })?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_mismatch_is_reported_as_corrupt() {
        let snapshot = SessionSnapshot::empty(gf_core::GfConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.gfs");
        write_session(&snapshot, &path).unwrap();

        // Bump the version byte right after the magic.
        let mut bytes = fs::read(&path).unwrap();
        bytes[8] = SessionHeader::VERSION + 1;
        fs::write(&path, bytes).unwrap();

        let err = read_session(&path).expect_err("future version should not decode");
        match err {
            ReportError::Corrupt { reason } => assert!(reason.contains("version")),
            other => panic!("expected corruption, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_length_must_match_the_file() {
        let snapshot = SessionSnapshot::empty(gf_core::GfConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.gfs");
        write_session(&snapshot, &path).unwrap();

        // Drop the last payload byte; the header still declares it.
        let mut bytes = fs::read(&path).unwrap();
        bytes.pop();
        fs::write(&path, bytes).unwrap();

        let err = read_session(&path).expect_err("truncated payload should not decode");
        match err {
            ReportError::Corrupt { reason } => assert!(reason.contains("length")),
            other => panic!("expected corruption, got {other:?}"),
        }
    }
}
