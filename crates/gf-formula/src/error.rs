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

//! Error type of the formula subsystem.

use gf_core::Status;
use thiserror::Error;

/// Convenient result alias for formula operations.
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Everything that can go wrong between formula source and an applied
/// tuning.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// The lexer hit a character it cannot start a token with.
    #[error("lex error at {line}:{column}: {message}")]
    Lex {
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        column: u32,
        /// What the lexer choked on.
        message: String,
    },

    /// The token stream does not match the grammar.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        column: u32,
        /// What the parser expected.
        message: String,
    },

    /// An assignment targets a name that is not a tunable output.
    #[error("'{name}' at {line}:{column} is not a tunable output")]
    UnknownOutput {
        /// The rejected assignment target.
        name: String,
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        column: u32,
    },

    /// Evaluation read a parameter that was never bound.
    #[error("parameter '{name}' is unbound")]
    UnboundParameter {
        /// The unresolved identifier.
        name: String,
    },

    /// Evaluation divided by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An output value failed the tuning range rules.
    #[error("output {field} = {value} is out of range: {reason}")]
    OutOfRange {
        /// The offending tunable output.
        field: &'static str,
        /// The value the formula produced.
        value: f64,
        /// Which rule it broke.
        reason: String,
    },

    /// A `.gff` file failed its structural or integrity checks.
    #[error("formula file corrupt: {reason}")]
    Corrupt {
        /// Which check failed.
        reason: String,
    },

    /// A `.gff` file could not be read or written.
    #[error("formula file I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl FormulaError {
    /// The packed status corresponding to this error.
    pub fn status(&self) -> Status {
        match self {
            Self::Lex { .. } => Status::FORMULA_LEX,
            Self::Parse { .. } | Self::UnknownOutput { .. } => Status::FORMULA_PARSE,
            Self::UnboundParameter { .. } => Status::FORMULA_UNDEFINED,
            Self::DivisionByZero => Status::FORMULA_DIV_ZERO,
            Self::OutOfRange { .. } => Status::FORMULA_RANGE,
            Self::Corrupt { .. } => Status::FORMULA_CORRUPT,
            Self::Io(_) => Status::FORMULA_IO,
        }
    }
}
