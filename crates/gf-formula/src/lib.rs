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

//! Tuning formulas: a small assignment language compiled to stack
//! programs.
//!
//! Formulas let tools adjust a context's tunable knobs (`target_fps`,
//! `drop_fps`, `ema_alpha`) from arithmetic over their current values
//! and runtime-bound parameters, without shipping new code:
//!
//! ```
//! use gf_core::Tuning;
//! use gf_formula::Program;
//!
//! let mut program = Program::compile(
//!     "// follow the observed rate down, never above target
//!      target_fps = min(target_fps, observed_fps + 5);",
//! )
//! .unwrap();
//! program.set_param("observed_fps", 47.0);
//!
//! let current = Tuning { target_fps: 60, drop_fps: 30, ema_alpha: 0.1 };
//! let tuned = program.apply(&current).unwrap();
//! assert_eq!(tuned.target_fps, 52);
//! ```
//!
//! Compiled source persists in `.gff` files with an integrity-checked
//! fixed header; see [`write_file`] and [`read_file`].

#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod parser;
pub mod program;
pub mod token;

pub use error::{FormulaError, FormulaResult};
pub use file::{read_file, write_file, FormulaHeader};
pub use program::Program;
