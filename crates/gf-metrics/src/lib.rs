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

//! The online analytics engine.
//!
//! [`GfContext`] ingests per-frame timing samples and produces a
//! normalized smoothness index with supporting percentile and jitter
//! metrics. Everything runs online over a fixed-capacity rolling
//! window: updates are O(1) and allocation-free, metric reads are O(n)
//! average over the window, and memory is bounded by the one allocation
//! made at construction.

#![warn(missing_docs)]

pub mod drops;
pub mod engine;
pub mod jitter;
pub mod select;
pub mod session;
pub mod window;

pub use engine::GfContext;
pub use session::{SampleRow, SessionMark, SessionSnapshot};
