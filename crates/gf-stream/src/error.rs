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

//! Error type of the streaming layer.

use gf_core::status::Status;
use thiserror::Error;

/// Convenience alias for streaming results.
pub type StreamResult<T> = Result<T, StreamError>;

/// Failures of the hub and client handles.
///
/// A full packet queue is deliberately *not* represented here: the live
/// feed sheds load by dropping packets, so [`StreamHub::publish`] stays
/// `Ok` and counts the loss instead.
///
/// [`StreamHub::publish`]: crate::hub::StreamHub::publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The hub was stopped; no further packets or commands move.
    #[error("stream hub is stopped")]
    Stopped,
    /// The bounded command queue is full; the hub is not draining fast
    /// enough and the client should retry later.
    #[error("command queue is full")]
    CommandQueueFull,
    /// The other end of the channel is gone.
    #[error("stream peer disconnected")]
    Disconnected,
}

impl StreamError {
    /// The packed status code for this failure.
    pub fn status(&self) -> Status {
        match self {
            StreamError::Stopped => Status::STREAM_STOPPED,
            StreamError::CommandQueueFull => Status::STREAM_FULL,
            StreamError::Disconnected => Status::STREAM_DISCONNECTED,
        }
    }
}
