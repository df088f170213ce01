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

//! Serializable snapshot of a context's recorded session.
//!
//! A snapshot carries everything needed to rebuild the context that
//! produced it: the originating configuration, the retained sample rows
//! in chronological order, the lifetime counters and any marks placed
//! during the run. Replaying the rows through a fresh context yields the
//! same metrics the live context reported.

use bincode::{Decode, Encode};
use gf_core::{GfConfig, Q8p8};
use serde::{Deserialize, Serialize};

/// One retained sample: the two timing series of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SampleRow {
    /// Frame time, Q8.8 milliseconds.
    pub frame_time: Q8p8,
    /// Input-to-photon latency, Q8.8 milliseconds.
    pub input_latency: Q8p8,
}

/// A labelled point of interest placed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SessionMark {
    /// Lifetime frame number the mark was placed at.
    pub frame: u64,
    /// Caller-supplied label.
    pub label: String,
}

/// Full recorded state of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SessionSnapshot {
    /// Configuration the originating context was built with.
    pub config: GfConfig,
    /// Lifetime count of ingested frames.
    pub frames_total: u64,
    /// Lifetime count of dropped frames.
    pub drops_total: u64,
    /// Retained samples, oldest first. Holds at most the window
    /// capacity; earlier samples were already overwritten when the
    /// snapshot was taken.
    pub rows: Vec<SampleRow>,
    /// Marks in placement order.
    pub marks: Vec<SessionMark>,
}

impl SessionSnapshot {
    /// An empty session under the given configuration.
    pub fn empty(config: GfConfig) -> Self {
        Self {
            config,
            frames_total: 0,
            drops_total: 0,
            rows: Vec::new(),
            marks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_has_no_rows_or_marks() {
        let snapshot = SessionSnapshot::empty(GfConfig::default());
        assert_eq!(snapshot.frames_total, 0);
        assert!(snapshot.rows.is_empty());
        assert!(snapshot.marks.is_empty());
    }

    #[test]
    fn test_snapshot_survives_binary_encoding() {
        let snapshot = SessionSnapshot {
            config: GfConfig::default(),
            frames_total: 3,
            drops_total: 1,
            rows: vec![
                SampleRow {
                    frame_time: Q8p8::from_ms(16.0),
                    input_latency: Q8p8::from_ms(5.0),
                },
                SampleRow {
                    frame_time: Q8p8::from_ms(100.0),
                    input_latency: Q8p8::from_ms(5.0),
                },
            ],
            marks: vec![SessionMark {
                frame: 2,
                label: "stutter burst".to_string(),
            }],
        };

        let bytes = bincode::encode_to_vec(&snapshot, bincode::config::standard())
            .expect("snapshot should encode");
        let (decoded, _): (SessionSnapshot, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard())
                .expect("snapshot should decode");
        assert_eq!(decoded, snapshot);
    }
}
