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

//! Allan-deviation jitter over the inter-frame delta series.
//!
//! Plain variance punishes a session whose frame times drift slowly,
//! even though drift is invisible to the eye. Differencing successive
//! deltas first cancels any linear trend, leaving only frame-to-frame
//! roughness, which is what a viewer perceives as stutter.

use gf_core::{sqrt_q16_to_q8, Q8p8};

/// Allan deviation of a chronological delta series, in Q8.8
/// milliseconds.
///
/// Fewer than two deltas carry no pair information and yield zero.
/// Squares of Q8.8 differences are Q16.16, accumulated in `u64`; the
/// Allan normalization halves the mean square before the root.
pub fn allan_jitter<I>(deltas: I) -> Q8p8
where
    I: IntoIterator<Item = Q8p8>,
{
    let mut iter = deltas.into_iter();
    let Some(first) = iter.next() else {
        return Q8p8::ZERO;
    };

    let mut prev = first;
    let mut sum_sq = 0u64;
    let mut pairs = 0u64;
    for delta in iter {
        let diff = u64::from(delta.abs_diff(prev).raw());
        sum_sq += diff * diff;
        pairs += 1;
        prev = delta;
    }
    if pairs == 0 {
        return Q8p8::ZERO;
    }

    sqrt_q16_to_q8(sum_sq / (2 * pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(raws: &[u16]) -> Vec<Q8p8> {
        raws.iter().copied().map(Q8p8::from_raw).collect()
    }

    #[test]
    fn test_fewer_than_two_deltas_yield_zero() {
        assert_eq!(allan_jitter(q(&[])), Q8p8::ZERO);
        assert_eq!(allan_jitter(q(&[4096])), Q8p8::ZERO);
    }

    #[test]
    fn test_constant_deltas_have_no_jitter() {
        assert_eq!(allan_jitter(q(&[512; 50])), Q8p8::ZERO);
    }

    #[test]
    fn test_alternating_deltas_match_the_closed_form() {
        // |diff| is constant at 512 (2 ms), so the deviation is
        // 512 / sqrt(2) = 362 raw regardless of length.
        let series: Vec<Q8p8> = (0..40)
            .map(|i| Q8p8::from_raw(if i % 2 == 0 { 1024 } else { 1536 }))
            .collect();
        assert_eq!(allan_jitter(series).raw(), 362);
    }

    #[test]
    fn test_linear_drift_cancels() {
        // Two series with the same slope but different bases; plain
        // variance would separate them, the Allan form does not.
        let low: Vec<Q8p8> = (0..60u16).map(|i| Q8p8::from_raw(i * 7)).collect();
        let high: Vec<Q8p8> = (0..60u16).map(|i| Q8p8::from_raw(2000 + i * 7)).collect();
        let jitter_low = allan_jitter(low);
        let jitter_high = allan_jitter(high);
        assert_eq!(jitter_low, jitter_high);
        // Constant slope 7 leaves 7 / sqrt(2) = 4 raw after rounding
        // down.
        assert_eq!(jitter_low.raw(), 4);
    }

    #[test]
    fn test_single_spike_at_the_end_counts_one_pair() {
        // 119 flat deltas then one 84 ms spike (21504 raw): one squared
        // difference of 21504^2 over 2 * 119 pairs.
        let mut deltas = vec![Q8p8::ZERO; 119];
        deltas.push(Q8p8::from_raw(21504));
        let expected = ((21504u64 * 21504) / (2 * 119)).isqrt() as u16;
        assert_eq!(allan_jitter(deltas).raw(), expected);
    }

    #[test]
    fn test_rougher_series_scores_higher() {
        let calm = q(&[512, 540, 512, 540, 520, 512]);
        let rough = q(&[512, 2048, 512, 3072, 512, 2560]);
        assert!(allan_jitter(rough) > allan_jitter(calm));
    }
}
