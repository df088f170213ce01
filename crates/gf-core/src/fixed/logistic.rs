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

//! Sampled logistic S-curve mapping an FPS ratio to a smoothness
//! contribution.
//!
//! The table holds 256 Q16.16 samples of the curve over the input
//! domain [0, 2). Lookups interpolate linearly between adjacent samples
//! in pure integer math; inputs outside the domain clamp to the table
//! ends. The table itself is built once, lazily, with float math and is
//! immutable afterwards.

use std::sync::OnceLock;

use super::{Q16p16, Q16_ONE};

/// Number of samples across the [0, 2) input domain.
const TABLE_LEN: usize = 256;

/// Upper bound of the input domain in Q16.16 (2.0).
const DOMAIN_END_Q16: u32 = 2 * Q16_ONE;

/// Q16.16 input width covered by one table step.
const STEP_Q16: u32 = DOMAIN_END_Q16 / TABLE_LEN as u32;

/// Steepness of the S-curve. Tunable.
const STEEPNESS: f64 = 8.0;

/// Input ratio mapped to the curve's inflection point. Tunable; 0.8
/// puts a session running exactly at its target FPS on the upper
/// shoulder of the curve instead of the ambivalent midpoint.
const MIDPOINT: f64 = 0.8;

static TABLE: OnceLock<[u32; TABLE_LEN]> = OnceLock::new();

fn table() -> &'static [u32; TABLE_LEN] {
    TABLE.get_or_init(|| {
        let mut samples = [0u32; TABLE_LEN];
        for (i, slot) in samples.iter_mut().enumerate() {
            let x = i as f64 * 2.0 / TABLE_LEN as f64;
            let sigma = 1.0 / (1.0 + (-STEEPNESS * (x - MIDPOINT)).exp());
            *slot = (sigma * f64::from(Q16_ONE)).round() as u32;
        }
        samples
    })
}

/// Evaluates the logistic S-curve at `x` with linear interpolation
/// between adjacent table samples.
///
/// Output is Q16.16 in [0, 65536). Inputs at or beyond the domain end
/// return the last table sample; there is no interpolation partner past
/// it.
pub fn logistic_q16(x: Q16p16) -> Q16p16 {
    let table = table();
    let raw = x.raw();
    if raw >= DOMAIN_END_Q16 - STEP_Q16 {
        return Q16p16::from_raw(table[TABLE_LEN - 1]);
    }
    let idx = (raw / STEP_Q16) as usize;
    let frac = u64::from(raw % STEP_Q16);
    let lo = u64::from(table[idx]);
    let hi = u64::from(table[idx + 1]);
    // The curve is monotone, so hi >= lo and the unsigned walk upward
    // from lo is safe.
    let value = lo + (hi - lo) * frac / u64::from(STEP_Q16);
    Q16p16::from_raw(value as u32)
}
