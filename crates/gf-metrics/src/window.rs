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

//! Fixed-capacity rolling window over per-frame samples.
//!
//! Three parallel series (frame time, input latency, inter-frame delta)
//! share one head and count, so a single push keeps them aligned. The
//! backing slices are allocated once at construction and never resized;
//! once the window is full, each push overwrites the oldest slot.

use gf_core::Q8p8;

/// Rolling window of per-frame samples.
#[derive(Debug)]
pub struct SampleWindow {
    frame: Box<[Q8p8]>,
    latency: Box<[Q8p8]>,
    delta: Box<[Q8p8]>,
    /// Index of the most recently written slot.
    head: usize,
    /// Number of live samples; saturates at capacity.
    count: usize,
}

impl SampleWindow {
    /// Allocates a window holding `capacity` samples per series.
    ///
    /// Capacity must be at least 2; configuration validation enforces
    /// this before a window is ever built.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 2, "window capacity must hold at least 2 samples");
        Self {
            frame: vec![Q8p8::ZERO; capacity].into_boxed_slice(),
            latency: vec![Q8p8::ZERO; capacity].into_boxed_slice(),
            delta: vec![Q8p8::ZERO; capacity].into_boxed_slice(),
            // Primed so the first push advances onto slot 0.
            head: capacity - 1,
            count: 0,
        }
    }

    /// The fixed per-series capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.frame.len()
    }

    /// Number of live samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no sample has been pushed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the window has wrapped at least once.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Pushes one aligned row across the three series, overwriting the
    /// oldest row once the window is full.
    pub fn push(&mut self, frame: Q8p8, latency: Q8p8, delta: Q8p8) {
        self.head = (self.head + 1) % self.capacity();
        self.frame[self.head] = frame;
        self.latency[self.head] = latency;
        self.delta[self.head] = delta;
        if self.count < self.capacity() {
            self.count += 1;
        }
    }

    /// The most recently pushed frame time.
    pub fn latest_frame(&self) -> Option<Q8p8> {
        if self.count == 0 {
            None
        } else {
            Some(self.frame[self.head])
        }
    }

    /// Live regions of a backing slice in chronological order: the tail
    /// segment after the wrap point, then the segment up to the head.
    fn live_split(&self) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        if self.count < self.capacity() {
            (0..self.count, 0..0)
        } else {
            (self.head + 1..self.capacity(), 0..self.head + 1)
        }
    }

    fn iter_series<'a>(&self, series: &'a [Q8p8]) -> impl Iterator<Item = Q8p8> + 'a {
        let (older, newer) = self.live_split();
        series[older].iter().chain(series[newer].iter()).copied()
    }

    /// Chronological (oldest to newest) inter-frame deltas.
    pub fn iter_deltas(&self) -> impl Iterator<Item = Q8p8> + '_ {
        self.iter_series(&self.delta)
    }

    /// Chronological (frame time, latency) rows, for session capture.
    pub fn rows(&self) -> impl Iterator<Item = (Q8p8, Q8p8)> + '_ {
        self.iter_series(&self.frame)
            .zip(self.iter_series(&self.latency))
    }

    /// Clones the live frame times into `scratch` for selection. Order
    /// is chronological, though selection does not depend on it.
    pub fn copy_frames_into(&self, scratch: &mut Vec<Q8p8>) {
        scratch.clear();
        scratch.extend(self.iter_series(&self.frame));
    }

    /// Clones the live latencies into `scratch` for selection.
    pub fn copy_latencies_into(&self, scratch: &mut Vec<Q8p8>) {
        scratch.clear();
        scratch.extend(self.iter_series(&self.latency));
    }
}
