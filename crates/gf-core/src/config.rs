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

//! Runtime configuration of an analytics context.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::{GfError, GfResult};

/// Highest accepted `target_fps`.
pub const MAX_TARGET_FPS: u32 = 1000;

/// Longest accepted analysis window, in milliseconds (10 minutes).
pub const MAX_WINDOW_MS: u32 = 600_000;

/// Hard cap on the window capacity; bounds the up-front allocation.
pub const MAX_RING_CAPACITY: usize = 1 << 20;

/// Parameters fixed when a context is built.
///
/// `window_ms` and `ring_capacity` size the one-time allocation and are
/// immutable for the context's lifetime. The threshold-like fields
/// (`target_fps`, `drop_fps`, `ema_alpha`) can later be adjusted through
/// a [`Tuning`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct GfConfig {
    /// Target frame rate the smoothness index is normalized against.
    pub target_fps: u32,
    /// Length of the rolling analysis window, in milliseconds.
    pub window_ms: u32,
    /// Frame rate whose period marks a frame as dropped; a frame longer
    /// than `1000 / drop_fps` ms counts against the drop rate.
    pub drop_fps: u32,
    /// Smoothing factor of the drop-rate EMA, within [0, 1].
    pub ema_alpha: f32,
    /// Explicit window capacity in samples. 0 derives the capacity from
    /// `window_ms` and `target_fps`.
    pub ring_capacity: usize,
}

impl Default for GfConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            window_ms: 1000,
            drop_fps: 30,
            ema_alpha: 0.1,
            ring_capacity: 0,
        }
    }
}

impl GfConfig {
    /// Checks every field against its accepted range, reporting the
    /// first violation.
    pub fn validate(&self) -> GfResult<()> {
        if self.target_fps == 0 || self.target_fps > MAX_TARGET_FPS {
            return Err(GfError::InvalidConfig {
                field: "target_fps",
                reason: format!("{} is outside 1..={MAX_TARGET_FPS}", self.target_fps),
            });
        }
        if self.window_ms == 0 || self.window_ms > MAX_WINDOW_MS {
            return Err(GfError::InvalidConfig {
                field: "window_ms",
                reason: format!("{} is outside 1..={MAX_WINDOW_MS}", self.window_ms),
            });
        }
        if self.drop_fps == 0 || self.drop_fps > self.target_fps {
            return Err(GfError::InvalidConfig {
                field: "drop_fps",
                reason: format!(
                    "{} is outside 1..=target_fps ({})",
                    self.drop_fps, self.target_fps
                ),
            });
        }
        if !self.ema_alpha.is_finite() || !(0.0..=1.0).contains(&self.ema_alpha) {
            return Err(GfError::InvalidConfig {
                field: "ema_alpha",
                reason: format!("{} is outside [0, 1]", self.ema_alpha),
            });
        }
        if self.ring_capacity == 1 {
            return Err(GfError::InvalidConfig {
                field: "ring_capacity",
                reason: "an explicit capacity must hold at least 2 samples".to_string(),
            });
        }
        let capacity = self.capacity();
        if capacity > MAX_RING_CAPACITY {
            return Err(GfError::CapacityTooLarge {
                requested: capacity,
                max: MAX_RING_CAPACITY,
            });
        }
        Ok(())
    }

    /// The effective window capacity in samples.
    ///
    /// An explicit `ring_capacity` wins; otherwise the capacity covers
    /// `window_ms` at the target rate, floored at two seconds' worth of
    /// target-rate samples so short windows still have enough depth for
    /// stable percentiles.
    pub fn capacity(&self) -> usize {
        if self.ring_capacity != 0 {
            return self.ring_capacity;
        }
        let covered = (u64::from(self.target_fps) * u64::from(self.window_ms) / 1000) as usize;
        covered.max(2 * self.target_fps as usize)
    }

    /// The adjustable subset of this configuration.
    pub fn tuning(&self) -> Tuning {
        Tuning {
            target_fps: self.target_fps,
            drop_fps: self.drop_fps,
            ema_alpha: self.ema_alpha,
        }
    }
}

/// The threshold-like knobs of a context, adjustable after construction.
///
/// Produced by tuning formulas and accepted by a context's tuning
/// update; validated with the same rules as the originating
/// configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Tuning {
    /// Target frame rate.
    pub target_fps: u32,
    /// Frame-drop threshold rate.
    pub drop_fps: u32,
    /// Drop-rate EMA smoothing factor.
    pub ema_alpha: f32,
}

impl Tuning {
    /// Checks the adjustable fields against their accepted ranges.
    pub fn validate(&self) -> GfResult<()> {
        if self.target_fps == 0 || self.target_fps > MAX_TARGET_FPS {
            return Err(GfError::InvalidTuning {
                field: "target_fps",
                reason: format!("{} is outside 1..={MAX_TARGET_FPS}", self.target_fps),
            });
        }
        if self.drop_fps == 0 || self.drop_fps > self.target_fps {
            return Err(GfError::InvalidTuning {
                field: "drop_fps",
                reason: format!(
                    "{} is outside 1..=target_fps ({})",
                    self.drop_fps, self.target_fps
                ),
            });
        }
        if !self.ema_alpha.is_finite() || !(0.0..=1.0).contains(&self.ema_alpha) {
            return Err(GfError::InvalidTuning {
                field: "ema_alpha",
                reason: format!("{} is outside [0, 1]", self.ema_alpha),
            });
        }
        Ok(())
    }
}
