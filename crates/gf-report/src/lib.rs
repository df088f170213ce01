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

//! Session persistence and offline reporting for the gf SDK.
//!
//! Recorded sessions land on disk as `.gfs` containers: a fixed header
//! with a BLAKE3 integrity hash over a bincode payload. Reading one
//! back rebuilds the analysis context and re-derives every metric from
//! the retained rows, so a report never disagrees with what a live
//! context would have said about the same samples.

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod report;
pub mod session;

pub use error::{ReportError, ReportResult};
pub use format::{SessionHeader, SESSION_MAGIC_BYTES};
pub use report::{analyze, analyze_to_report, write_report, FloatMetrics, GfrReport, RawMetrics};
pub use session::{read_session, write_session};
