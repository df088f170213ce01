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

//! The telemetry hub and its client handles.
//!
//! The hub fans metrics packets out over a bounded mpmc queue and drains
//! a bounded command queue fed by clients. The packet path never blocks
//! the frame loop: when the queue is full the packet is dropped and
//! counted, on the grounds that a live feed which stalls its producer is
//! worse than one with holes in it. Commands go the other way and are
//! *not* lossy; a full command queue is reported to the client so it can
//! back off.

use crate::error::{StreamError, StreamResult};
use crate::packet::{StreamCaps, StreamCommand, StreamPacket, PROTO_VERSION};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Sizing knobs for [`StreamHub::start`].
#[derive(Debug, Clone)]
pub struct StreamHubConfig {
    /// Capacity of the lossy packet queue.
    pub packet_capacity: usize,
    /// Capacity of the client command queue.
    pub command_capacity: usize,
    /// Analysis window capacity announced in the capabilities packet,
    /// in samples.
    pub window_capacity: usize,
}

impl Default for StreamHubConfig {
    fn default() -> Self {
        Self {
            packet_capacity: 256,
            command_capacity: 32,
            window_capacity: 0,
        }
    }
}

/// Fan-out point for live telemetry.
///
/// The hub owns both queues. Dropping it disconnects every client:
/// pending packets stay readable, after which receivers observe the
/// hang-up.
pub struct StreamHub {
    caps: StreamCaps,
    running: AtomicBool,
    packet_tx: flume::Sender<StreamPacket>,
    packet_rx: flume::Receiver<StreamPacket>,
    cmd_tx: crossbeam_channel::Sender<StreamCommand>,
    cmd_rx: crossbeam_channel::Receiver<StreamCommand>,
    published: AtomicU64,
    dropped: AtomicU64,
}

/// A connected consumer: one packet receiver plus one command sender.
///
/// Receivers are peers on a shared queue. A single client sees the whole
/// feed; several clients split it between them, each packet going to
/// exactly one.
pub struct StreamClient {
    packets: flume::Receiver<StreamPacket>,
    commands: crossbeam_channel::Sender<StreamCommand>,
}

impl StreamHub {
    /// Brings the hub up and queues the capabilities announcement so the
    /// first client to connect learns what it is talking to.
    pub fn start(config: StreamHubConfig) -> Self {
        let (packet_tx, packet_rx) = flume::bounded(config.packet_capacity);
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.command_capacity);
        let hub = Self {
            caps: StreamCaps {
                proto_version: PROTO_VERSION,
                window_capacity: config.window_capacity as u32,
                supports_metrics: true,
                supports_commands: true,
            },
            running: AtomicBool::new(true),
            packet_tx,
            packet_rx,
            cmd_tx,
            cmd_rx,
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        };
        log::info!(
            "Stream hub started: {} packet slots, {} command slots.",
            config.packet_capacity,
            config.command_capacity
        );
        // Infallible right after start: the hub is running and holds a
        // receiver, and the queue is empty.
        let _ = hub.send_capabilities();
        hub
    }

    /// Hands out a client handle sharing the packet and command queues.
    pub fn connect(&self) -> StreamClient {
        StreamClient {
            packets: self.packet_rx.clone(),
            commands: self.cmd_tx.clone(),
        }
    }

    /// Offers a packet to the feed.
    ///
    /// Returns `Ok` even when the queue is full; the packet is shed and
    /// accounted under [`dropped`](Self::dropped). Fails only when the
    /// hub is stopped.
    pub fn publish(&self, packet: StreamPacket) -> StreamResult<()> {
        if !self.running.load(Ordering::Relaxed) {
            return Err(StreamError::Stopped);
        }
        match self.packet_tx.try_send(packet) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(flume::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("Packet queue full; shedding one packet.");
                Ok(())
            }
            Err(flume::TrySendError::Disconnected(_)) => Err(StreamError::Disconnected),
        }
    }

    /// Re-announces the hub capabilities on the feed.
    ///
    /// [`start`](Self::start) publishes them once; call this again when a
    /// late client needs the banner without replaying the queue.
    pub fn send_capabilities(&self) -> StreamResult<()> {
        self.publish(StreamPacket::Capabilities(self.caps))
    }

    /// Takes the next pending client command, if any. Never blocks.
    pub fn poll_cmd(&self) -> StreamResult<Option<StreamCommand>> {
        if !self.running.load(Ordering::Relaxed) {
            return Err(StreamError::Stopped);
        }
        match self.cmd_rx.try_recv() {
            Ok(command) => Ok(Some(command)),
            Err(crossbeam_channel::TryRecvError::Empty) => Ok(None),
            Err(crossbeam_channel::TryRecvError::Disconnected) => Err(StreamError::Disconnected),
        }
    }

    /// Stops the hub. Subsequent [`publish`](Self::publish) and
    /// [`poll_cmd`](Self::poll_cmd) calls fail with
    /// [`StreamError::Stopped`]; already-queued packets stay readable.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            log::info!(
                "Stream hub stopped after {} packets ({} shed).",
                self.published.load(Ordering::Relaxed),
                self.dropped.load(Ordering::Relaxed)
            );
        }
    }

    /// Whether the hub still accepts packets and commands.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Packets accepted onto the feed since start, the capabilities
    /// banner included.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Packets shed because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for StreamHub {
    fn drop(&mut self) {
        self.stop();
    }
}

impl StreamClient {
    /// The packet feed. Blocking and timed receives both work; after the
    /// hub is dropped the receiver drains what is queued and then reports
    /// disconnection.
    pub fn packets(&self) -> &flume::Receiver<StreamPacket> {
        &self.packets
    }

    /// Queues a command for the hub.
    pub fn send_command(&self, command: StreamCommand) -> StreamResult<()> {
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(crossbeam_channel::TrySendError::Full(_)) => Err(StreamError::CommandQueueFull),
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                Err(StreamError::Disconnected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::metrics::GfMetrics;
    use std::thread;
    use std::time::Duration;

    fn small_hub(packet_capacity: usize, command_capacity: usize) -> StreamHub {
        StreamHub::start(StreamHubConfig {
            packet_capacity,
            command_capacity,
            window_capacity: 120,
        })
    }

    #[test]
    fn test_capabilities_packet_greets_the_first_client() {
        let hub = small_hub(8, 4);
        let client = hub.connect();

        let packet = client
            .packets()
            .recv_timeout(Duration::from_millis(100))
            .expect("capabilities should be queued at start");

        match packet {
            StreamPacket::Capabilities(caps) => {
                assert_eq!(caps.proto_version, PROTO_VERSION);
                assert_eq!(caps.window_capacity, 120);
                assert!(caps.supports_metrics);
                assert!(caps.supports_commands);
            }
            other => panic!("expected capabilities, got {:?}", other),
        }
        assert_eq!(hub.published(), 1);
        assert_eq!(hub.dropped(), 0);
    }

    #[test]
    fn test_packets_arrive_in_publish_order() {
        let hub = small_hub(8, 4);
        let client = hub.connect();

        hub.publish(StreamPacket::Metrics(GfMetrics::default()))
            .unwrap();
        hub.publish(StreamPacket::Marked {
            frame: 42,
            label: "checkpoint".to_string(),
        })
        .unwrap();

        let timeout = Duration::from_millis(100);
        assert!(matches!(
            client.packets().recv_timeout(timeout).unwrap(),
            StreamPacket::Capabilities(_)
        ));
        assert!(matches!(
            client.packets().recv_timeout(timeout).unwrap(),
            StreamPacket::Metrics(_)
        ));
        match client.packets().recv_timeout(timeout).unwrap() {
            StreamPacket::Marked { frame, label } => {
                assert_eq!(frame, 42);
                assert_eq!(label, "checkpoint");
            }
            other => panic!("expected mark, got {:?}", other),
        }
    }

    #[test]
    fn test_full_queue_sheds_packets_without_failing() {
        // Two slots; the capabilities banner takes the first.
        let hub = small_hub(2, 4);

        hub.publish(StreamPacket::Metrics(GfMetrics::default()))
            .unwrap();
        hub.publish(StreamPacket::Metrics(GfMetrics::default()))
            .unwrap();
        hub.publish(StreamPacket::Metrics(GfMetrics::default()))
            .unwrap();

        assert_eq!(hub.published(), 2);
        assert_eq!(hub.dropped(), 2);

        // Draining makes room again.
        let client = hub.connect();
        let timeout = Duration::from_millis(100);
        client.packets().recv_timeout(timeout).unwrap();
        hub.publish(StreamPacket::Metrics(GfMetrics::default()))
            .unwrap();
        assert_eq!(hub.published(), 3);
    }

    #[test]
    fn test_commands_flow_from_client_to_hub() {
        let hub = small_hub(8, 4);
        let client = hub.connect();

        client
            .send_command(StreamCommand::Mark("boss fight".to_string()))
            .unwrap();
        client
            .send_command(StreamCommand::PaceGuard { drop_fps: 30 })
            .unwrap();

        assert_eq!(
            hub.poll_cmd().unwrap(),
            Some(StreamCommand::Mark("boss fight".to_string()))
        );
        assert_eq!(
            hub.poll_cmd().unwrap(),
            Some(StreamCommand::PaceGuard { drop_fps: 30 })
        );
        assert_eq!(hub.poll_cmd().unwrap(), None);
    }

    #[test]
    fn test_command_overflow_is_reported_to_the_client() {
        let hub = small_hub(8, 1);
        let client = hub.connect();

        client.send_command(StreamCommand::Snapshot).unwrap();
        let err = client
            .send_command(StreamCommand::Snapshot)
            .expect_err("second command should not fit");

        assert_eq!(err, StreamError::CommandQueueFull);
        assert_eq!(err.status(), gf_core::status::Status::STREAM_FULL);
        // The hub was never stopped, so draining still works.
        assert_eq!(hub.poll_cmd().unwrap(), Some(StreamCommand::Snapshot));
    }

    #[test]
    fn test_stopped_hub_rejects_traffic() {
        let hub = small_hub(8, 4);
        assert!(hub.is_running());

        hub.stop();

        assert!(!hub.is_running());
        assert_eq!(
            hub.publish(StreamPacket::Metrics(GfMetrics::default())),
            Err(StreamError::Stopped)
        );
        assert_eq!(hub.poll_cmd(), Err(StreamError::Stopped));
        assert_eq!(
            StreamError::Stopped.status(),
            gf_core::status::Status::STREAM_STOPPED
        );
    }

    #[test]
    fn test_dropping_the_hub_disconnects_clients() {
        let hub = small_hub(8, 4);
        let client = hub.connect();
        drop(hub);

        // The queued capabilities banner drains first.
        let timeout = Duration::from_millis(100);
        assert!(matches!(
            client.packets().recv_timeout(timeout).unwrap(),
            StreamPacket::Capabilities(_)
        ));
        assert!(client.packets().recv_timeout(timeout).is_err());
        assert_eq!(
            client.send_command(StreamCommand::Snapshot),
            Err(StreamError::Disconnected)
        );
    }

    #[test]
    fn test_two_clients_split_the_feed() {
        let hub = small_hub(8, 4);
        let first = hub.connect();
        let second = hub.connect();

        let timeout = Duration::from_millis(100);
        // One receiver takes the banner; every packet goes to exactly one.
        first.packets().recv_timeout(timeout).unwrap();

        hub.publish(StreamPacket::Marked {
            frame: 1,
            label: "a".to_string(),
        })
        .unwrap();
        hub.publish(StreamPacket::Marked {
            frame: 2,
            label: "b".to_string(),
        })
        .unwrap();

        let to_first = first.packets().recv_timeout(timeout).unwrap();
        let to_second = second.packets().recv_timeout(timeout).unwrap();
        assert!(matches!(to_first, StreamPacket::Marked { frame: 1, .. }));
        assert!(matches!(to_second, StreamPacket::Marked { frame: 2, .. }));
    }

    #[test]
    fn test_publishing_from_another_thread() {
        let hub = small_hub(8, 4);
        let client = hub.connect();

        let handle = thread::spawn(move || {
            hub.publish(StreamPacket::Metrics(GfMetrics::default()))
                .unwrap();
        });
        handle.join().unwrap();

        // Banner first, then the cross-thread packet; the hub dropped in
        // the worker, so the queue drains and hangs up.
        let timeout = Duration::from_millis(100);
        assert!(matches!(
            client.packets().recv_timeout(timeout).unwrap(),
            StreamPacket::Capabilities(_)
        ));
        assert!(matches!(
            client.packets().recv_timeout(timeout).unwrap(),
            StreamPacket::Metrics(_)
        ));
        assert!(client.packets().recv_timeout(timeout).is_err());
    }
}
