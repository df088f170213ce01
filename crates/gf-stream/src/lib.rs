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

//! Live telemetry fan-out for the gf SDK.
//!
//! A [`StreamHub`] sits beside the analysis engine and forwards metrics
//! snapshots and session marks to any number of [`StreamClient`] handles
//! over a bounded in-process queue, trading completeness for a frame
//! loop that never blocks on its observers. Clients answer back over a
//! separate command queue with snapshot, mark, and retune requests.

#![warn(missing_docs)]

pub mod error;
pub mod hub;
pub mod packet;

pub use error::{StreamError, StreamResult};
pub use hub::{StreamClient, StreamHub, StreamHubConfig};
pub use packet::{StreamCaps, StreamCommand, StreamPacket, PROTO_VERSION};
