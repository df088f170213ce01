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

//! Messages exchanged between the hub and its clients.

use gf_core::metrics::GfMetrics;

/// Protocol revision announced in [`StreamCaps`]. Bumped whenever the
/// packet layout changes incompatibly.
pub const PROTO_VERSION: u16 = 1;

/// What the hub can do, announced to clients in the first packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCaps {
    /// Protocol revision of the packet stream.
    pub proto_version: u16,
    /// Capacity of the analysis window backing each metrics packet,
    /// in samples.
    pub window_capacity: u32,
    /// Whether metrics packets will be published.
    pub supports_metrics: bool,
    /// Whether the hub drains the command queue.
    pub supports_commands: bool,
}

/// A message flowing from the hub to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPacket {
    /// Hub capabilities; the first packet every client sees.
    Capabilities(StreamCaps),
    /// A metrics snapshot from the analysis engine.
    Metrics(GfMetrics),
    /// A session mark was placed at the given frame.
    Marked {
        /// Total frame count when the mark was placed.
        frame: u64,
        /// Free-form annotation supplied by the caller.
        label: String,
    },
}

/// A request flowing from a client back to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamCommand {
    /// Persist the current session state.
    Snapshot,
    /// Place a labelled mark at the current frame.
    Mark(String),
    /// Retune the dropped-frame threshold to the given rate.
    PaceGuard {
        /// Frame rate whose period marks a frame as dropped.
        drop_fps: u32,
    },
}
