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

//! The `.gff` formula file container.
//!
//! A formula file carries the raw source verbatim behind a fixed-size
//! header: magic bytes, a format version, the declared source length
//! and a BLAKE3 hash of the source. The header is a fixed layout parsed
//! directly from bytes; reading verifies every field before the source
//! is recompiled.

use std::convert::TryInto;
use std::fs;
use std::path::Path;

use log::info;

use crate::error::{FormulaError, FormulaResult};
use crate::program::Program;

/// A unique byte sequence to identify formula files ("GFFORMLA").
pub const FORMULA_MAGIC_BYTES: [u8; 8] = *b"GFFORMLA";

/// The fixed-size header at the beginning of every formula file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaHeader {
    /// Magic bytes to identify the file type, must be
    /// [`FORMULA_MAGIC_BYTES`].
    pub magic_bytes: [u8; 8],
    /// The version of the header format itself.
    pub format_version: u8,
    /// The length of the source text that follows this header, in
    /// bytes.
    pub source_length: u64,
    /// BLAKE3 hash of the source text.
    pub source_hash: [u8; 32],
}

impl FormulaHeader {
    /// The total size of the header in bytes.
    pub const SIZE: usize = 8 + 1 + 8 + 32;

    /// The current header format version.
    pub const VERSION: u8 = 1;

    /// Builds the header describing `source`.
    pub fn for_source(source: &str) -> Self {
        Self {
            magic_bytes: FORMULA_MAGIC_BYTES,
            format_version: Self::VERSION,
            source_length: source.len() as u64,
            source_hash: *blake3::hash(source.as_bytes()).as_bytes(),
        }
    }

    /// Serializes the header into its on-disk layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic_bytes);
        bytes[8] = self.format_version;
        bytes[9..17].copy_from_slice(&self.source_length.to_le_bytes());
        bytes[17..Self::SIZE].copy_from_slice(&self.source_hash);
        bytes
    }

    /// Attempts to parse a `FormulaHeader` from the beginning of a byte
    /// slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, &'static str> {
        if bytes.len() < Self::SIZE {
            return Err("not enough bytes to form a valid header");
        }

        let magic_bytes: [u8; 8] = bytes[0..8].try_into().unwrap();
        if magic_bytes != FORMULA_MAGIC_BYTES {
            return Err("invalid magic bytes; not a formula file");
        }

        let format_version = bytes[8];
        let source_length = u64::from_le_bytes(bytes[9..17].try_into().unwrap());
        let source_hash: [u8; 32] = bytes[17..Self::SIZE].try_into().unwrap();

        Ok(Self {
            magic_bytes,
            format_version,
            source_length,
            source_hash,
        })
    }
}

/// Compiles `source` and, if it is valid, persists it at `path`.
///
/// Compiling first keeps broken formulas off the disk entirely.
pub fn write_file(path: &Path, source: &str) -> FormulaResult<()> {
    Program::compile(source)?;
    let header = FormulaHeader::for_source(source);
    let mut bytes = Vec::with_capacity(FormulaHeader::SIZE + source.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(source.as_bytes());
    fs::write(path, bytes)?;
    info!(
        "wrote formula {} ({} bytes of source)",
        path.display(),
        source.len()
    );
    Ok(())
}

/// Reads, verifies and recompiles the formula stored at `path`.
///
/// Returns the program together with the verbatim source, so callers
/// can display or re-persist it.
pub fn read_file(path: &Path) -> FormulaResult<(Program, String)> {
    let bytes = fs::read(path)?;
    let header = FormulaHeader::from_bytes(&bytes).map_err(|reason| FormulaError::Corrupt {
        reason: reason.to_string(),
    })?;
    if header.format_version != FormulaHeader::VERSION {
        return Err(FormulaError::Corrupt {
            reason: format!(
                "unsupported format version {} (expected {})",
                header.format_version,
                FormulaHeader::VERSION
            ),
        });
    }

    let body = &bytes[FormulaHeader::SIZE..];
    if header.source_length != body.len() as u64 {
        return Err(FormulaError::Corrupt {
            reason: format!(
                "declared {} source bytes but {} follow the header",
                header.source_length,
                body.len()
            ),
        });
    }
    if blake3::hash(body).as_bytes() != &header.source_hash {
        return Err(FormulaError::Corrupt {
            reason: "source hash mismatch".to_string(),
        });
    }

    let source = String::from_utf8(body.to_vec()).map_err(|_| FormulaError::Corrupt {
        reason: "source is not valid UTF-8".to_string(),
    })?;
    let program = Program::compile(&source)?;
    Ok((program, source))
}
