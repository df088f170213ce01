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

//! Dropped-frame tracking: threshold indicator smoothed by a
//! single-pole EMA.

use gf_core::fixed::{Q16_ONE, Q8_ONE};
use gf_core::{Q16p16, Q8p8};

/// Tracks the rate of frames slower than the drop threshold.
///
/// The rate is a Q16.16 EMA of a 0/1 indicator, updated once per
/// sample: `rate' = ((1 - alpha) * rate + alpha * indicator)`. The
/// update truncates, which keeps the approach monotonic from either
/// side and lets an all-quiet series decay to exactly zero.
#[derive(Debug)]
pub struct DropTracker {
    threshold: Q8p8,
    alpha: Q16p16,
    rate: Q16p16,
}

impl DropTracker {
    /// Builds a tracker dropping frames slower than `1000 / drop_fps`
    /// milliseconds.
    pub fn new(drop_fps: u32, ema_alpha: f32) -> Self {
        Self {
            threshold: drop_threshold(drop_fps),
            alpha: Q16p16::from_unit_f32(ema_alpha),
            rate: Q16p16::ZERO,
        }
    }

    /// Adopts new threshold parameters while preserving the smoothed
    /// rate.
    pub fn retune(&mut self, drop_fps: u32, ema_alpha: f32) {
        self.threshold = drop_threshold(drop_fps);
        self.alpha = Q16p16::from_unit_f32(ema_alpha);
    }

    /// Folds one frame time into the rate. Returns whether the frame
    /// counted as dropped.
    pub fn observe(&mut self, frame_time: Q8p8) -> bool {
        let dropped = frame_time > self.threshold;
        let indicator: u64 = if dropped { u64::from(Q16_ONE) } else { 0 };
        let alpha = u64::from(self.alpha.raw());
        let one = u64::from(Q16_ONE);
        let blended = ((one - alpha) * u64::from(self.rate.raw()) + alpha * indicator) >> 16;
        self.rate = Q16p16::from_raw(blended as u32);
        dropped
    }

    /// The smoothed drop rate, full Q16.16 precision.
    #[inline]
    pub fn rate(&self) -> Q16p16 {
        self.rate
    }

    /// The smoothed drop rate as a Q8.8 fraction of 1.0.
    #[inline]
    pub fn rate_q8(&self) -> Q8p8 {
        // The rate never exceeds 1.0, so the shifted value fits.
        Q8p8::from_raw((self.rate.raw() >> 8) as u16)
    }

    /// The active drop threshold.
    #[inline]
    pub fn threshold(&self) -> Q8p8 {
        self.threshold
    }
}

/// Threshold period of `drop_fps`, in Q8.8 milliseconds.
///
/// Rates below 4 FPS (including a zero rate, which validation rejects
/// upstream) would need periods past the Q8.8 ceiling; they saturate to
/// it, and since no sample can exceed the ceiling either, such
/// thresholds never fire.
fn drop_threshold(drop_fps: u32) -> Q8p8 {
    if drop_fps == 0 {
        return Q8p8::MAX;
    }
    let raw = (1000 * u32::from(Q8_ONE) + drop_fps / 2) / drop_fps;
    if raw > u32::from(u16::MAX) {
        Q8p8::MAX
    } else {
        Q8p8::from_raw(raw as u16)
    }
}
