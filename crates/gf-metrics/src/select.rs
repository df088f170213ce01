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

//! Order statistics over window scratch copies.
//!
//! Percentiles are resolved by an in-place Hoare-partition quickselect
//! with a median-of-three pivot: O(n) average, no full sort, no
//! allocation beyond the scratch the caller already owns. The result
//! depends only on the multiset of values, never on their order.

use gf_core::Q8p8;

/// The 95th-percentile sample of `scratch`, which is reordered in
/// place.
///
/// Uses the lower-rank convention `k = floor(0.95 * (n - 1))`, so a
/// single sample is its own percentile. An empty slice yields zero;
/// callers guard the empty window before asking for metrics.
pub fn percentile95(scratch: &mut [Q8p8]) -> Q8p8 {
    if scratch.is_empty() {
        return Q8p8::ZERO;
    }
    let k = (scratch.len() - 1) * 95 / 100;
    select_kth(scratch, k)
}

/// Selects the `k`-th smallest element (0-based) of `samples`,
/// reordering the slice in place.
///
/// # Panics
///
/// Panics if `samples` is empty or `k` is out of bounds.
pub fn select_kth(samples: &mut [Q8p8], k: usize) -> Q8p8 {
    assert!(k < samples.len(), "selection rank out of bounds");
    let mut lo = 0;
    let mut hi = samples.len() - 1;
    // 1. Narrow the partition window until it collapses on rank k.
    while lo < hi {
        let split = partition(samples, lo, hi);
        // Hoare partition: [lo..=split] <= pivot <= [split+1..=hi].
        if k <= split {
            hi = split;
        } else {
            lo = split + 1;
        }
    }
    samples[k]
}

/// Hoare partition of `samples[lo..=hi]` around a median-of-three
/// pivot. Returns the split point; both halves are always non-empty,
/// which guarantees progress in the selection loop.
fn partition(samples: &mut [Q8p8], lo: usize, hi: usize) -> usize {
    let mid = lo + (hi - lo) / 2;
    let pivot = median_of_three(samples[lo], samples[mid], samples[hi]);
    let mut i = lo;
    let mut j = hi;
    loop {
        // 2. Walk both cursors toward the middle.
        while samples[i] < pivot {
            i += 1;
        }
        while samples[j] > pivot {
            j -= 1;
        }
        if i >= j {
            return j;
        }
        samples.swap(i, j);
        i += 1;
        j -= 1;
    }
}

fn median_of_three(a: Q8p8, b: Q8p8, c: Q8p8) -> Q8p8 {
    a.min(b).max(a.max(b).min(c))
}
