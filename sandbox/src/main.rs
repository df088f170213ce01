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

// gf SDK Sandbox
// Drives the whole pipeline over a scripted workload: a context ingests
// synthetic frames, a hub streams the metrics to a consumer thread, the
// consumer answers back with commands, and the run ends as .gfs + .gfr
// files on disk.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use gf_core::{FrameSample, GfConfig, Q8p8};
use gf_metrics::GfContext;
use gf_report::{analyze_to_report, write_session};
use gf_stream::{StreamClient, StreamCommand, StreamHub, StreamHubConfig, StreamPacket};

/// Frames in the scripted run.
const TOTAL_FRAMES: u32 = 600;
/// One metrics packet per this many frames.
const PUBLISH_EVERY: u32 = 30;
/// First frame of the stutter burst.
const STUTTER_START: u32 = 200;

/// Tuning derived from an externally observed rate; persisted and
/// reloaded through a `.gff` container before it is applied.
const FORMULA_SRC: &str = "\
// Derived pacing targets for the sandbox run.
target_fps = clamp(observed_fps, 30, 144);
drop_fps = max(24, target_fps / 2);
";

/// The scripted timings: steady 16 ms frames at 5 ms latency, a stutter
/// burst at [`STUTTER_START`], a latency spike from frame 400.
fn synthetic_sample(frame: u32) -> FrameSample {
    let (frame_ms, latency_ms) = if (STUTTER_START..STUTTER_START + 8).contains(&frame) {
        (95.0, 8.0)
    } else if (400..440).contains(&frame) {
        (17.0, 120.0)
    } else {
        (16.0, 5.0)
    };
    FrameSample::from_times(Q8p8::from_ms(frame_ms), Q8p8::from_ms(latency_ms))
}

/// Drains the packet feed, prints what flows past, and reacts once to a
/// collapsing index with a mark and a pace guard request.
fn spawn_consumer(client: StreamClient) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let mut seen = 0u64;
        let mut reacted = false;
        while let Ok(packet) = client.packets().recv() {
            seen += 1;
            match packet {
                StreamPacket::Capabilities(caps) => {
                    log::info!(
                        "consumer: proto {} feed over a {}-sample window",
                        caps.proto_version,
                        caps.window_capacity
                    );
                }
                StreamPacket::Metrics(metrics) => {
                    log::info!(
                        "consumer: index {:3} | fps {:6.1} | jitter {:5.2} ms | drops {:4.1}%",
                        metrics.index,
                        metrics.fps_f32(),
                        metrics.jitter.to_ms(),
                        f32::from(metrics.drop_rate.raw()) * 100.0 / 256.0
                    );
                    if metrics.index < 50 && !reacted {
                        reacted = true;
                        let mark = StreamCommand::Mark("observed collapse".to_string());
                        if client.send_command(mark).is_ok() {
                            let _ = client.send_command(StreamCommand::PaceGuard { drop_fps: 24 });
                            log::info!("consumer: requested a pace guard");
                        }
                    }
                }
                StreamPacket::Marked { frame, label } => {
                    log::info!("consumer: mark '{label}' at frame {frame}");
                    let _ = client.send_command(StreamCommand::Snapshot);
                }
            }
        }
        seen
    })
}

/// Executes whatever the consumer asked for since the last frame.
fn service_commands(hub: &StreamHub, context: &mut GfContext) -> Result<()> {
    while let Some(command) = hub.poll_cmd()? {
        match command {
            StreamCommand::Snapshot => {
                let path = Path::new("sandbox-ondemand.gfs");
                write_session(&context.snapshot(), path)?;
                log::info!("on-demand snapshot written to {}", path.display());
            }
            StreamCommand::Mark(label) => {
                context.mark(&label);
            }
            StreamCommand::PaceGuard { drop_fps } => {
                let mut tuning = context.config().tuning();
                tuning.drop_fps = drop_fps;
                match context.apply_tuning(tuning) {
                    Ok(()) => log::info!("pace guard engaged at {drop_fps} FPS"),
                    Err(err) => log::warn!("pace guard rejected: {err}"),
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = GfConfig::default();
    let mut context = GfContext::new(config)?;

    let hub = StreamHub::start(StreamHubConfig {
        window_capacity: config.capacity(),
        ..Default::default()
    });
    let consumer = spawn_consumer(hub.connect());

    // Tuning formula: persist, reload, bind the observed rate, apply.
    let formula_path = Path::new("sandbox-tuning.gff");
    gf_formula::write_file(formula_path, FORMULA_SRC)?;
    let (mut program, _source) = gf_formula::read_file(formula_path)?;
    program.set_param("observed_fps", 58.0);
    let tuning = program.apply(&config.tuning())?;
    context.apply_tuning(tuning)?;
    log::info!(
        "formula applied: target {} FPS, drops measured against {} FPS",
        tuning.target_fps,
        tuning.drop_fps
    );

    for frame in 0..TOTAL_FRAMES {
        if frame == STUTTER_START {
            context.mark("stutter burst");
            hub.publish(StreamPacket::Marked {
                frame: context.frames_total(),
                label: "stutter burst".to_string(),
            })?;
        }
        context.update(synthetic_sample(frame));

        if (frame + 1) % PUBLISH_EVERY == 0 {
            let metrics = context.metrics()?;
            hub.publish(StreamPacket::Metrics(metrics))?;
        }
        service_commands(&hub, &mut context)?;

        // Stand-in for the frame's real work.
        thread::sleep(Duration::from_millis(1));
    }

    let metrics = context.metrics()?;
    match context.hint()? {
        Some(advice) => log::info!("final index {}; hint: {advice}", metrics.index),
        None => log::info!("final index {}; no remediation needed", metrics.index),
    }
    log::info!(
        "{} frames ingested, {} dropped",
        context.frames_total(),
        context.drops_total()
    );

    let session_path = Path::new("sandbox-session.gfs");
    let report_path = Path::new("sandbox-report.gfr");
    write_session(&context.snapshot(), session_path)?;
    let report = analyze_to_report(session_path, report_path)?;
    log::info!(
        "report written to {} (offline index {})",
        report_path.display(),
        report.index
    );

    hub.stop();
    drop(hub);
    let seen = consumer.join().expect("consumer thread should not panic");
    log::info!("consumer drained {seen} packets");
    Ok(())
}
