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

//! Foundational contracts of the gf SDK.
//!
//! This crate defines everything the analytics layers agree on without
//! depending on each other: the fixed-point kernel types, the runtime
//! configuration, the per-frame sample and metrics snapshot values, and
//! the packed status taxonomy with its error registry. It performs no
//! I/O and owns no threads.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fixed;
pub mod metrics;
pub mod status;

pub use config::{GfConfig, Tuning};
pub use error::{GfError, GfResult, LastError};
pub use fixed::{logistic_q16, sqrt_q16_to_q8, Q16p16, Q8p8};
pub use metrics::{FrameSample, GfMetrics, PaceFlags};
pub use status::Status;
