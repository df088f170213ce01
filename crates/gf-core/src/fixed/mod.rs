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

//! Integer fixed-point kernel used by every hot-path computation.
//!
//! Two widths cover the SDK's needs: [`Q8p8`] stores millisecond
//! quantities in 16 bits (1.0 ms = 256) and [`Q16p16`] carries
//! dimensionless ratios and smoothing state in 32 bits (1.0 = 65536).
//! Conversions clamp at the documented range limits instead of wrapping,
//! so an out-of-range frame time reads as the format maximum rather than
//! aliasing to a small value.

mod logistic;

pub use logistic::logistic_q16;

use bincode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

// --- Fundamental Constants ---

/// Raw value of 1.0 in the Q8.8 format (1.0 ms).
pub const Q8_ONE: u16 = 1 << 8;

/// Raw value of 1.0 in the Q16.16 format.
pub const Q16_ONE: u32 = 1 << 16;

/// Unsigned 8.8 fixed-point millisecond value.
///
/// Covers 0 ms up to a hard format ceiling of ~255.996 ms. Frame or
/// latency times beyond the ceiling saturate to [`Q8p8::MAX`]; they are
/// never wrapped.
#[repr(transparent)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct Q8p8(pub u16);

impl Q8p8 {
    /// 0.0 ms.
    pub const ZERO: Self = Self(0);
    /// 1.0 ms.
    pub const ONE: Self = Self(Q8_ONE);
    /// The format ceiling, ~255.996 ms.
    pub const MAX: Self = Self(u16::MAX);

    /// Wraps a raw Q8.8 value.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw Q8.8 bits.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Converts a millisecond quantity to Q8.8, rounding to nearest.
    ///
    /// Negative and NaN inputs clamp to zero; inputs at or beyond
    /// 256.0 ms clamp to [`Q8p8::MAX`].
    #[inline]
    pub fn from_ms(ms: f32) -> Self {
        // Saturating float-to-int cast handles NaN, negatives and the
        // ceiling in one step.
        Self((ms * 256.0).round() as u16)
    }

    /// Converts back to milliseconds.
    #[inline]
    pub fn to_ms(self) -> f32 {
        f32::from(self.0) / 256.0
    }

    /// Widens to Q16.16 without loss.
    #[inline]
    pub const fn widen(self) -> Q16p16 {
        Q16p16((self.0 as u32) << 8)
    }

    /// Absolute difference of two Q8.8 values.
    #[inline]
    pub const fn abs_diff(self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }

    /// Saturating addition.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

/// Unsigned 16.16 fixed-point value.
///
/// Carries dimensionless ratios (actual FPS over target FPS, drop-rate
/// state) and values produced by the logistic curve. 1.0 = 65536.
#[repr(transparent)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct Q16p16(pub u32);

impl Q16p16 {
    /// 0.0.
    pub const ZERO: Self = Self(0);
    /// 1.0.
    pub const ONE: Self = Self(Q16_ONE);
    /// The format ceiling, ~65535.99998.
    pub const MAX: Self = Self(u32::MAX);

    /// Wraps a raw Q16.16 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw Q16.16 bits.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Builds the Q16.16 ratio `num / den` of two equally-scaled
    /// integers, saturating at the format ceiling.
    ///
    /// A zero denominator saturates instead of trapping; callers
    /// validate their inputs, this keeps the kernel total.
    #[inline]
    pub const fn from_ratio(num: u32, den: u32) -> Self {
        if den == 0 {
            return Self::MAX;
        }
        let wide = ((num as u64) << 16) / den as u64;
        if wide > u32::MAX as u64 {
            Self::MAX
        } else {
            Self(wide as u32)
        }
    }

    /// Converts a float in [0, 1] (e.g. a smoothing factor) to Q16.16,
    /// rounding to nearest and clamping out-of-range inputs.
    #[inline]
    pub fn from_unit_f32(v: f32) -> Self {
        let clamped = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self((f64::from(clamped) * f64::from(Q16_ONE)).round() as u32)
    }

    /// Converts to a float.
    #[inline]
    pub fn to_f32(self) -> f32 {
        (f64::from(self.0) / f64::from(Q16_ONE)) as f32
    }

    /// Narrows to Q8.8, truncating the low fraction bits and saturating
    /// values beyond the Q8.8 ceiling.
    #[inline]
    pub const fn narrow(self) -> Q8p8 {
        let shifted = self.0 >> 8;
        if shifted > u16::MAX as u32 {
            Q8p8::MAX
        } else {
            Q8p8(shifted as u16)
        }
    }
}

/// Integer square root mapping a Q16.16-scaled mean square to its Q8.8
/// root.
///
/// `sqrt(x * 2^16) == sqrt(x) * 2^8`, so the Q8.8 result falls out of a
/// plain integer square root with no rescaling pass. The accumulator is
/// taken as `u64` because mean squares of Q8.8 values can exceed 32
/// bits. Exact on perfect squares, monotone everywhere, saturating at
/// [`Q8p8::MAX`].
#[inline]
pub const fn sqrt_q16_to_q8(mean_sq: u64) -> Q8p8 {
    let root = mean_sq.isqrt();
    if root > u16::MAX as u64 {
        Q8p8::MAX
    } else {
        Q8p8(root as u16)
    }
}
