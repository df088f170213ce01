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

//! Packed status codes and the static error registry.
//!
//! Every failure in the SDK maps to one [`Status`]: a `u32` packing
//! `(facility << 16) | (module << 8) | code`. The low byte doubles as a
//! flat code shared across facilities, so callers that only care about
//! the kind of failure can compare [`Status::code`] values while
//! diagnostics keep the full triple. The registry resolves any status
//! to a name and message, falling back to a catch-all entry for codes
//! it has never heard of.

/// Facility identifiers, bits 16..24 of a packed status.
pub mod facility {
    /// Foundational types and configuration.
    pub const CORE: u8 = 0x01;
    /// The analytics engine.
    pub const METRICS: u8 = 0x02;
    /// The tuning formula compiler.
    pub const FORMULA: u8 = 0x03;
    /// Live telemetry fan-out.
    pub const STREAM: u8 = 0x04;
    /// Session and report files.
    pub const REPORT: u8 = 0x05;
}

/// Module identifiers, bits 8..16 of a packed status.
pub mod module {
    /// Configuration validation.
    pub const CONFIG: u8 = 0x01;
    /// Context lifecycle and metric computation.
    pub const ENGINE: u8 = 0x02;
    /// Formula lexing.
    pub const LEXER: u8 = 0x11;
    /// Formula parsing.
    pub const PARSER: u8 = 0x12;
    /// Compiled-program evaluation.
    pub const PROGRAM: u8 = 0x13;
    /// Formula file persistence.
    pub const FORMULA_FILE: u8 = 0x14;
    /// The stream hub.
    pub const HUB: u8 = 0x21;
    /// Session container I/O.
    pub const SESSION: u8 = 0x31;
    /// Offline re-analysis.
    pub const ANALYZER: u8 = 0x32;
}

/// Flat error codes, bits 0..8, shared across facilities.
pub mod code {
    /// Success.
    pub const OK: u8 = 0x00;
    /// An argument or field was out of range.
    pub const INVALID_ARG: u8 = 0x01;
    /// A requested allocation exceeded the supported bound.
    pub const NO_MEMORY: u8 = 0x02;
    /// The operation is not valid in the current state.
    pub const BAD_STATE: u8 = 0x03;
    /// Source text failed to lex or parse.
    pub const PARSE: u8 = 0x04;
    /// An underlying I/O operation failed.
    pub const IO: u8 = 0x05;
    /// Serialized data failed an integrity or format check.
    pub const CORRUPT: u8 = 0x06;
    /// A computed value fell outside its accepted range.
    pub const RANGE: u8 = 0x07;
    /// A referenced name is not defined.
    pub const UNDEFINED: u8 = 0x08;
    /// A bounded queue is full.
    pub const FULL: u8 = 0x09;
    /// The component was stopped before the call.
    pub const STOPPED: u8 = 0x0A;
    /// Division by zero during evaluation.
    pub const DIV_ZERO: u8 = 0x0B;
    /// Catch-all for codes the registry does not know.
    pub const UNKNOWN: u8 = 0xFF;
}

/// A packed status code.
///
/// See the module docs for the layout. `Status` values are plain data:
/// building one never allocates and comparing two is a `u32` compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(u32);

impl Status {
    /// Success.
    pub const OK: Self = Self(0);

    /// A configuration field failed validation.
    pub const CONFIG_INVALID: Self = Self::new(facility::CORE, module::CONFIG, code::INVALID_ARG);
    /// The requested window capacity exceeds the supported bound.
    pub const CAPACITY_LIMIT: Self = Self::new(facility::CORE, module::CONFIG, code::NO_MEMORY);
    /// Metrics were requested from a context holding no samples.
    pub const ENGINE_EMPTY: Self = Self::new(facility::METRICS, module::ENGINE, code::BAD_STATE);
    /// A tuning update failed validation.
    pub const TUNING_RANGE: Self = Self::new(facility::METRICS, module::ENGINE, code::RANGE);
    /// Formula source failed to lex.
    pub const FORMULA_LEX: Self = Self::new(facility::FORMULA, module::LEXER, code::PARSE);
    /// Formula source failed to parse.
    pub const FORMULA_PARSE: Self = Self::new(facility::FORMULA, module::PARSER, code::PARSE);
    /// A formula referenced a parameter that was never bound.
    pub const FORMULA_UNDEFINED: Self =
        Self::new(facility::FORMULA, module::PROGRAM, code::UNDEFINED);
    /// A formula divided by zero during evaluation.
    pub const FORMULA_DIV_ZERO: Self = Self::new(facility::FORMULA, module::PROGRAM, code::DIV_ZERO);
    /// A formula produced a tuning value outside its accepted range.
    pub const FORMULA_RANGE: Self = Self::new(facility::FORMULA, module::PROGRAM, code::RANGE);
    /// A formula file failed to read or write.
    pub const FORMULA_IO: Self = Self::new(facility::FORMULA, module::FORMULA_FILE, code::IO);
    /// A formula file failed its integrity or format check.
    pub const FORMULA_CORRUPT: Self =
        Self::new(facility::FORMULA, module::FORMULA_FILE, code::CORRUPT);
    /// The stream hub was used after `stop`.
    pub const STREAM_STOPPED: Self = Self::new(facility::STREAM, module::HUB, code::STOPPED);
    /// The command queue is full.
    pub const STREAM_FULL: Self = Self::new(facility::STREAM, module::HUB, code::FULL);
    /// The peer side of the stream went away.
    pub const STREAM_DISCONNECTED: Self = Self::new(facility::STREAM, module::HUB, code::BAD_STATE);
    /// A session file failed to read or write.
    pub const SESSION_IO: Self = Self::new(facility::REPORT, module::SESSION, code::IO);
    /// A session file failed its integrity or format check.
    pub const SESSION_CORRUPT: Self = Self::new(facility::REPORT, module::SESSION, code::CORRUPT);
    /// A report file failed to write.
    pub const REPORT_IO: Self = Self::new(facility::REPORT, module::ANALYZER, code::IO);

    /// Packs a `(facility, module, code)` triple.
    #[inline]
    pub const fn new(facility: u8, module: u8, code: u8) -> Self {
        Self(((facility as u32) << 16) | ((module as u32) << 8) | code as u32)
    }

    /// Rebuilds a status from its packed representation.
    #[inline]
    pub const fn from_packed(raw: u32) -> Self {
        Self(raw)
    }

    /// The packed `u32` representation.
    #[inline]
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// The facility byte.
    #[inline]
    pub const fn facility(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// The module byte.
    #[inline]
    pub const fn module(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The flat code byte, comparable across facilities.
    #[inline]
    pub const fn code(self) -> u8 {
        self.0 as u8
    }

    /// Resolves this status against the registry.
    ///
    /// Total: unregistered statuses resolve to the catch-all entry.
    pub fn describe(self) -> &'static StatusEntry {
        REGISTRY
            .iter()
            .find(|entry| entry.status == self)
            .unwrap_or(&UNKNOWN_ENTRY)
    }

    /// Shorthand for the registered name.
    pub fn name(self) -> &'static str {
        self.describe().name
    }
}

/// One row of the error registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    /// The packed status this entry describes.
    pub status: Status,
    /// Stable symbolic name.
    pub name: &'static str,
    /// Human-readable description.
    pub message: &'static str,
}

const UNKNOWN_ENTRY: StatusEntry = StatusEntry {
    status: Status::new(0, 0, code::UNKNOWN),
    name: "UNKNOWN",
    message: "unregistered status code",
};

/// The registry itself. Linear lookup; the table is small and cold.
static REGISTRY: &[StatusEntry] = &[
    StatusEntry {
        status: Status::OK,
        name: "OK",
        message: "success",
    },
    StatusEntry {
        status: Status::CONFIG_INVALID,
        name: "CONFIG_INVALID",
        message: "a configuration field is out of range",
    },
    StatusEntry {
        status: Status::CAPACITY_LIMIT,
        name: "CAPACITY_LIMIT",
        message: "requested window capacity exceeds the supported bound",
    },
    StatusEntry {
        status: Status::ENGINE_EMPTY,
        name: "ENGINE_EMPTY",
        message: "no samples have been ingested yet",
    },
    StatusEntry {
        status: Status::TUNING_RANGE,
        name: "TUNING_RANGE",
        message: "a tuning value is out of range",
    },
    StatusEntry {
        status: Status::FORMULA_LEX,
        name: "FORMULA_LEX",
        message: "formula source contains an invalid token",
    },
    StatusEntry {
        status: Status::FORMULA_PARSE,
        name: "FORMULA_PARSE",
        message: "formula source failed to parse",
    },
    StatusEntry {
        status: Status::FORMULA_UNDEFINED,
        name: "FORMULA_UNDEFINED",
        message: "formula references an unbound parameter",
    },
    StatusEntry {
        status: Status::FORMULA_DIV_ZERO,
        name: "FORMULA_DIV_ZERO",
        message: "formula divided by zero",
    },
    StatusEntry {
        status: Status::FORMULA_RANGE,
        name: "FORMULA_RANGE",
        message: "formula produced an out-of-range tuning value",
    },
    StatusEntry {
        status: Status::FORMULA_IO,
        name: "FORMULA_IO",
        message: "formula file I/O failed",
    },
    StatusEntry {
        status: Status::FORMULA_CORRUPT,
        name: "FORMULA_CORRUPT",
        message: "formula file failed its integrity check",
    },
    StatusEntry {
        status: Status::STREAM_STOPPED,
        name: "STREAM_STOPPED",
        message: "the stream hub is stopped",
    },
    StatusEntry {
        status: Status::STREAM_FULL,
        name: "STREAM_FULL",
        message: "the command queue is full",
    },
    StatusEntry {
        status: Status::STREAM_DISCONNECTED,
        name: "STREAM_DISCONNECTED",
        message: "the stream peer disconnected",
    },
    StatusEntry {
        status: Status::SESSION_IO,
        name: "SESSION_IO",
        message: "session file I/O failed",
    },
    StatusEntry {
        status: Status::SESSION_CORRUPT,
        name: "SESSION_CORRUPT",
        message: "session file failed its integrity check",
    },
    StatusEntry {
        status: Status::REPORT_IO,
        name: "REPORT_IO",
        message: "report file I/O failed",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_round_trips_the_triple() {
        let status = Status::new(facility::FORMULA, module::PROGRAM, code::DIV_ZERO);
        assert_eq!(status.facility(), facility::FORMULA);
        assert_eq!(status.module(), module::PROGRAM);
        assert_eq!(status.code(), code::DIV_ZERO);
        assert_eq!(Status::from_packed(status.packed()), status);
    }

    #[test]
    fn flat_code_is_shared_across_facilities() {
        // Both I/O statuses expose the same flat code even though the
        // packed values differ.
        assert_eq!(Status::FORMULA_IO.code(), Status::SESSION_IO.code());
        assert_ne!(Status::FORMULA_IO, Status::SESSION_IO);
    }

    #[test]
    fn every_registered_status_resolves_to_itself() {
        for entry in REGISTRY {
            let found = entry.status.describe();
            assert_eq!(found.status, entry.status, "bad lookup for {}", entry.name);
            assert_eq!(found.name, entry.name);
        }
    }

    #[test]
    fn registered_names_are_unique() {
        for (i, a) in REGISTRY.iter().enumerate() {
            for b in &REGISTRY[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.status, b.status, "duplicate status for {}", a.name);
            }
        }
    }

    #[test]
    fn unregistered_statuses_fall_back_to_the_catch_all() {
        let bogus = Status::new(0x7F, 0x7F, 0x7F);
        let entry = bogus.describe();
        assert_eq!(entry.name, "UNKNOWN");
        assert_eq!(bogus.name(), "UNKNOWN");
    }
}
