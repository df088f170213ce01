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

//! The `.gfs` session container header.
//!
//! Fixed layout, parsed directly from bytes: magic, a format version,
//! the declared payload length and a BLAKE3 hash of the payload. The
//! bincode payload follows immediately after.

use std::convert::TryInto;

/// A unique byte sequence to identify session files ("GFSESSN1").
pub const SESSION_MAGIC_BYTES: [u8; 8] = *b"GFSESSN1";

/// The fixed-size header at the beginning of every session file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    /// Magic bytes to identify the file type, must be
    /// [`SESSION_MAGIC_BYTES`].
    pub magic_bytes: [u8; 8],
    /// The version of the header format itself.
    pub format_version: u8,
    /// The length of the bincode payload that follows this header, in
    /// bytes.
    pub payload_length: u64,
    /// BLAKE3 hash of the payload.
    pub payload_hash: [u8; 32],
}

impl SessionHeader {
    /// The total size of the header in bytes.
    pub const SIZE: usize = 8 + 1 + 8 + 32;

    /// The current header format version.
    pub const VERSION: u8 = 1;

    /// Builds the header describing `payload`.
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            magic_bytes: SESSION_MAGIC_BYTES,
            format_version: Self::VERSION,
            payload_length: payload.len() as u64,
            payload_hash: *blake3::hash(payload).as_bytes(),
        }
    }

    /// Serializes the header into its on-disk layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic_bytes);
        bytes[8] = self.format_version;
        bytes[9..17].copy_from_slice(&self.payload_length.to_le_bytes());
        bytes[17..Self::SIZE].copy_from_slice(&self.payload_hash);
        bytes
    }

    /// Attempts to parse a `SessionHeader` from the beginning of a byte
    /// slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, &'static str> {
        if bytes.len() < Self::SIZE {
            return Err("not enough bytes to form a valid header");
        }

        let magic_bytes: [u8; 8] = bytes[0..8].try_into().unwrap();
        if magic_bytes != SESSION_MAGIC_BYTES {
            return Err("invalid magic bytes; not a session file");
        }

        let format_version = bytes[8];
        let payload_length = u64::from_le_bytes(bytes[9..17].try_into().unwrap());
        let payload_hash: [u8; 32] = bytes[17..Self::SIZE].try_into().unwrap();

        Ok(Self {
            magic_bytes,
            format_version,
            payload_length,
            payload_hash,
        })
    }
}
