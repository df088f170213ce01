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

//! Value types shared across the SDK: per-frame samples, the metrics
//! snapshot, and condition flags.

use bincode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::fixed::Q8p8;

/// One frame's worth of caller-supplied telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct FrameSample {
    /// CPU frame time, in Q8.8 milliseconds.
    pub frame_time: Q8p8,
    /// Input-to-display latency, in Q8.8 milliseconds.
    pub input_latency: Q8p8,
    /// Draw calls issued this frame. Accepted for API stability; never
    /// influences metrics and is not persisted.
    pub draw_calls: u32,
    /// Objects left after culling this frame. Accepted for API
    /// stability; never influences metrics and is not persisted.
    pub visible_objects: u32,
    /// Camera translation since the previous frame. Accepted for API
    /// stability; never influences metrics and is not persisted.
    pub camera_motion: [f32; 2],
}

impl FrameSample {
    /// Builds a sample carrying timings only, with the auxiliary fields
    /// zeroed.
    pub fn from_times(frame_time: Q8p8, input_latency: Q8p8) -> Self {
        Self {
            frame_time,
            input_latency,
            ..Self::default()
        }
    }
}

/// Condition flags raised by the analytics engine.
///
/// Multiple conditions can be raised together; jitter above the pacing
/// threshold also clears the micro-stutter threshold, so both bits are
/// set for badly paced sessions.
#[repr(transparent)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct PaceFlags {
    bits: u16,
}

impl PaceFlags {
    /// No condition raised.
    pub const NONE: Self = Self { bits: 0 };
    /// Frame pacing unstable: jitter above 4 ms.
    pub const PACING: Self = Self { bits: 1 << 0 };
    /// Visible micro-stutter: jitter above 2 ms.
    pub const MICRO_STUTTER: Self = Self { bits: 1 << 1 };
    /// Input-to-display latency above 90 ms.
    pub const INPUT_LAG: Self = Self { bits: 1 << 2 };

    /// Builds flags from raw bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    /// The raw bits.
    #[inline]
    pub const fn bits(&self) -> u16 {
        self.bits
    }

    /// Combines two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Checks whether every bit of `other` is raised here.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Checks whether no condition is raised.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Names of the raised conditions, for reports and logs.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::PACING) {
            names.push("PACING");
        }
        if self.contains(Self::MICRO_STUTTER) {
            names.push("MICRO_STUTTER");
        }
        if self.contains(Self::INPUT_LAG) {
            names.push("INPUT_LAG");
        }
        names
    }
}

/// A full metrics snapshot produced by the analytics engine.
///
/// Fixed 16-byte `repr(C)` layout with no padding, so a snapshot can be
/// published over the stream as plain bytes.
#[repr(C)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct GfMetrics {
    /// Smoothness index in integer points, always within [0, 100].
    pub index: u16,
    /// Raised condition flags.
    pub flags: PaceFlags,
    /// 95th-percentile frame time, Q8.8 ms.
    pub ft_p95: Q8p8,
    /// 95th-percentile input latency, Q8.8 ms.
    pub lat_p95: Q8p8,
    /// Allan-deviation frame-to-frame jitter, Q8.8 ms.
    pub jitter: Q8p8,
    /// Dropped-frame rate EMA as a Q8.8 fraction of 1.0.
    pub drop_rate: Q8p8,
    /// Penalized FPS estimate in Q8.8 scale. Carried in 32 bits because
    /// the 3000 FPS cap does not fit the 16-bit Q8.8 range.
    pub fps: u32,
}

impl GfMetrics {
    /// The FPS estimate as a float.
    #[inline]
    pub fn fps_f32(&self) -> f32 {
        self.fps as f32 / 256.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_layout_is_sixteen_packed_bytes() {
        assert_eq!(std::mem::size_of::<GfMetrics>(), 16);
        // Pod round-trip through raw bytes.
        let snapshot = GfMetrics {
            index: 86,
            flags: PaceFlags::MICRO_STUTTER,
            ft_p95: Q8p8::from_raw(4096),
            lat_p95: Q8p8::from_raw(1280),
            jitter: Q8p8::from_raw(512),
            drop_rate: Q8p8::from_raw(25),
            fps: 16000,
        };
        let bytes = bytemuck::bytes_of(&snapshot);
        let back: GfMetrics = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, snapshot);
    }

    #[test]
    fn flags_combine_and_query() {
        let both = PaceFlags::PACING.union(PaceFlags::MICRO_STUTTER);
        assert!(both.contains(PaceFlags::PACING));
        assert!(both.contains(PaceFlags::MICRO_STUTTER));
        assert!(!both.contains(PaceFlags::INPUT_LAG));
        assert!(!both.is_empty());
        assert!(PaceFlags::NONE.is_empty());
        assert_eq!(PaceFlags::from_bits(both.bits()), both);
    }

    #[test]
    fn flag_names_follow_the_raised_bits() {
        let flags = PaceFlags::PACING.union(PaceFlags::INPUT_LAG);
        assert_eq!(flags.names(), vec!["PACING", "INPUT_LAG"]);
        assert!(PaceFlags::NONE.names().is_empty());
    }

    #[test]
    fn timing_only_sample_zeroes_the_rest() {
        let sample = FrameSample::from_times(Q8p8::from_ms(16.0), Q8p8::from_ms(5.0));
        assert_eq!(sample.draw_calls, 0);
        assert_eq!(sample.visible_objects, 0);
        assert_eq!(sample.camera_motion, [0.0, 0.0]);
    }
}
