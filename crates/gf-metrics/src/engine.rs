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

//! The analytics context: sample ingest, metric computation and
//! session state.

use gf_core::fixed::{Q16_ONE, Q8_ONE};
use gf_core::{
    logistic_q16, FrameSample, GfConfig, GfError, GfMetrics, GfResult, LastError, PaceFlags,
    Q16p16, Q8p8, Status, Tuning,
};
use log::{debug, info, trace};

use crate::drops::DropTracker;
use crate::jitter::allan_jitter;
use crate::select::percentile95;
use crate::session::{SampleRow, SessionMark, SessionSnapshot};
use crate::window::SampleWindow;

/// Jitter above this raises [`PaceFlags::PACING`] (4 ms).
const PACING_JITTER: Q8p8 = Q8p8::from_raw(4 * Q8_ONE);

/// Jitter above this raises [`PaceFlags::MICRO_STUTTER`] (2 ms).
const MICRO_STUTTER_JITTER: Q8p8 = Q8p8::from_raw(2 * Q8_ONE);

/// Latency above this raises [`PaceFlags::INPUT_LAG`] (90 ms).
const INPUT_LAG_LATENCY: Q8p8 = Q8p8::from_raw(90 * Q8_ONE);

/// Jitter that discounts the FPS estimate to zero: one full 60 FPS
/// frame period (16.7 ms), Q8.8.
const JITTER_FULL_SCALE_Q8: u32 = 4275;

/// Latency that discounts the FPS estimate to zero (400 ms), Q8.8.
/// Held in 32 bits; the value is past the u16 Q8.8 ceiling on purpose
/// so real samples can only ever reach a partial discount.
const LATENCY_FULL_SCALE_Q8: u32 = 400 * Q8_ONE as u32;

/// Ceiling of the FPS estimate (3000 FPS), Q8.8 scale.
const FPS_CAP_Q8: u32 = 3000 * Q8_ONE as u32;

/// Index points deducted per percent of dropped frames.
const DROP_PENALTY_PER_PCT: u16 = 2;

/// Largest total drop deduction.
const DROP_PENALTY_CAP: u16 = 20;

/// Origin tag recorded into [`LastError`] values raised here.
const ORIGIN: &str = "gf_ctx";

/// Online analytics over a rolling window of frame samples.
///
/// A context makes its single allocation at construction and never
/// grows it: [`GfContext::update`] is O(1) and allocation-free, metric
/// reads run a linear-average selection over the window. All arithmetic
/// is integer fixed-point, so equal sample streams produce equal
/// metrics on every platform.
#[derive(Debug)]
pub struct GfContext {
    config: GfConfig,
    window: SampleWindow,
    drops: DropTracker,
    frames_total: u64,
    drops_total: u64,
    marks: Vec<SessionMark>,
    last_error: Option<LastError>,
    scratch: Vec<Q8p8>,
}

impl GfContext {
    /// Builds a context from a validated configuration.
    pub fn new(config: GfConfig) -> GfResult<Self> {
        config.validate()?;
        let capacity = config.capacity();
        info!(
            "analytics context online: target {} FPS, window of {capacity} samples",
            config.target_fps
        );
        Ok(Self {
            window: SampleWindow::new(capacity),
            drops: DropTracker::new(config.drop_fps, config.ema_alpha),
            frames_total: 0,
            drops_total: 0,
            marks: Vec::new(),
            last_error: None,
            scratch: Vec::with_capacity(capacity),
            config,
        })
    }

    /// Rebuilds a context from a recorded session.
    ///
    /// The retained rows are replayed through a fresh context, then the
    /// lifetime counters and marks are restored from the snapshot. When
    /// the originating window had not wrapped yet, the rebuilt context
    /// reports the same metrics the live one did; after a wrap, the
    /// oldest retained sample has lost its predecessor and the jitter
    /// and drop EMA are re-anchored at the start of the rows.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> GfResult<Self> {
        let mut ctx = Self::new(snapshot.config)?;
        for row in &snapshot.rows {
            ctx.update(FrameSample::from_times(row.frame_time, row.input_latency));
        }
        ctx.frames_total = snapshot.frames_total;
        ctx.drops_total = snapshot.drops_total;
        ctx.marks = snapshot.marks.clone();
        Ok(ctx)
    }

    /// Ingests one frame sample. Never fails; out-of-range timings were
    /// already clamped by the Q8.8 conversion.
    pub fn update(&mut self, sample: FrameSample) {
        let delta = match self.window.latest_frame() {
            Some(previous) => sample.frame_time.abs_diff(previous),
            None => Q8p8::ZERO,
        };
        self.window
            .push(sample.frame_time, sample.input_latency, delta);
        if self.drops.observe(sample.frame_time) {
            self.drops_total += 1;
            trace!(
                "frame {} dropped: {:.2} ms over the {:.2} ms threshold",
                self.frames_total,
                sample.frame_time.to_ms(),
                self.drops.threshold().to_ms()
            );
        }
        self.frames_total += 1;
    }

    /// Computes the full metrics snapshot over the current window.
    ///
    /// Takes `&mut self` to reuse the internal selection scratch and to
    /// record failures; the sample state is left untouched. Fails with
    /// [`GfError::EmptyWindow`] until the first sample arrives.
    pub fn metrics(&mut self) -> GfResult<GfMetrics> {
        if self.window.is_empty() {
            self.raise(Status::ENGINE_EMPTY, 0, line!());
            return Err(GfError::EmptyWindow);
        }

        self.window.copy_frames_into(&mut self.scratch);
        let ft_p95 = percentile95(&mut self.scratch);
        self.window.copy_latencies_into(&mut self.scratch);
        let lat_p95 = percentile95(&mut self.scratch);
        let jitter = allan_jitter(self.window.iter_deltas());
        let drop_rate = self.drops.rate_q8();

        let fps = fps_estimate(ft_p95, jitter, lat_p95);
        let index = composite_index(fps, self.config.target_fps, drop_rate);
        let flags = condition_flags(jitter, lat_p95);
        debug!(
            "metrics over {} samples: index {index}, {:.1} FPS, jitter {:.2} ms, flags {:?}",
            self.window.len(),
            fps as f32 / 256.0,
            jitter.to_ms(),
            flags.names()
        );

        Ok(GfMetrics {
            index,
            flags,
            ft_p95,
            lat_p95,
            jitter,
            drop_rate,
            fps,
        })
    }

    /// The highest-priority remediation for the current conditions, or
    /// `None` when the session is smooth.
    ///
    /// Unstable pacing outranks input lag, which outranks residual
    /// micro-stutter; fixing delivery cadence usually clears the
    /// lower-priority conditions with it.
    pub fn hint(&mut self) -> GfResult<Option<&'static str>> {
        let metrics = self.metrics()?;
        Ok(advice_for(metrics.flags))
    }

    /// Adjusts the threshold knobs mid-session.
    ///
    /// The window and its contents are untouched; only the drop
    /// threshold, the EMA smoothing factor and the index normalization
    /// target change going forward.
    pub fn apply_tuning(&mut self, tuning: Tuning) -> GfResult<()> {
        if let Err(err) = tuning.validate() {
            self.raise(err.status(), 0, line!());
            return Err(err);
        }
        self.config.target_fps = tuning.target_fps;
        self.config.drop_fps = tuning.drop_fps;
        self.config.ema_alpha = tuning.ema_alpha;
        self.drops.retune(tuning.drop_fps, tuning.ema_alpha);
        debug!(
            "tuning applied: target {} FPS, drop threshold {} FPS, alpha {}",
            tuning.target_fps, tuning.drop_fps, tuning.ema_alpha
        );
        Ok(())
    }

    /// Places a labelled mark at the current frame number.
    pub fn mark(&mut self, label: &str) {
        debug!("session mark {label:?} at frame {}", self.frames_total);
        self.marks.push(SessionMark {
            frame: self.frames_total,
            label: label.to_string(),
        });
    }

    /// Captures the session state for persistence or replay.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            config: self.config,
            frames_total: self.frames_total,
            drops_total: self.drops_total,
            rows: self
                .window
                .rows()
                .map(|(frame_time, input_latency)| SampleRow {
                    frame_time,
                    input_latency,
                })
                .collect(),
            marks: self.marks.clone(),
        }
    }

    /// The active configuration, including any applied tuning.
    pub fn config(&self) -> &GfConfig {
        &self.config
    }

    /// Lifetime count of ingested frames.
    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    /// Lifetime count of dropped frames.
    pub fn drops_total(&self) -> u64 {
        self.drops_total
    }

    /// The most recent failure recorded by this context, if any.
    ///
    /// The record persists across later successful calls, so a caller
    /// polling only occasionally still sees what went wrong last.
    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    fn raise(&mut self, status: Status, detail: i64, line: u32) {
        self.last_error = Some(LastError {
            status,
            detail,
            line,
            origin: ORIGIN,
        });
    }
}

/// Penalized FPS estimate in Q8.8 scale.
///
/// The base rate `1000 ms / ft_p95` is discounted by two linear
/// factors: jitter relative to a full 60 FPS frame period and latency
/// relative to 400 ms. Either factor reaching its full scale floors
/// the estimate at zero. A zero frame time reads as the cap rather
/// than dividing by zero.
fn fps_estimate(ft_p95: Q8p8, jitter: Q8p8, lat_p95: Q8p8) -> u32 {
    if ft_p95.raw() == 0 {
        return FPS_CAP_Q8;
    }
    // 1000 ms in Q8.8 over a Q8.8 frame time: scale by 256 twice.
    let base = 65_536_000u64 / u64::from(ft_p95.raw());
    let jitter_factor = unit_discount(u32::from(jitter.raw()), JITTER_FULL_SCALE_Q8);
    let latency_factor = unit_discount(u32::from(lat_p95.raw()), LATENCY_FULL_SCALE_Q8);
    let discounted = (base * u64::from(jitter_factor)) >> 16;
    let discounted = (discounted * u64::from(latency_factor)) >> 16;
    discounted.min(u64::from(FPS_CAP_Q8)) as u32
}

/// `1 - min(value / full_scale, 1)` in Q16.16.
fn unit_discount(value_q8: u32, full_scale_q8: u32) -> u32 {
    let ratio = ((u64::from(value_q8) << 16) / u64::from(full_scale_q8)).min(u64::from(Q16_ONE));
    Q16_ONE - ratio as u32
}

/// Maps the FPS estimate and drop rate to the index in [0, 100].
///
/// The FPS-to-target ratio runs through the logistic curve for the
/// core score, then the drop rate deducts [`DROP_PENALTY_PER_PCT`]
/// points per percent dropped, capped at [`DROP_PENALTY_CAP`].
fn composite_index(fps_q8: u32, target_fps: u32, drop_rate: Q8p8) -> u16 {
    let ratio = Q16p16::from_ratio(fps_q8, target_fps << 8);
    let core = ((u64::from(logistic_q16(ratio).raw()) * 100) >> 16) as u16;
    let drop_pct = ((u32::from(drop_rate.raw()) * 100) >> 8) as u16;
    let penalty = drop_pct.saturating_mul(DROP_PENALTY_PER_PCT).min(DROP_PENALTY_CAP);
    core.min(100).saturating_sub(penalty)
}

/// Condition flags whose thresholds the current jitter and latency
/// levels clear. Strictly above; sitting exactly on a threshold does
/// not raise it.
fn condition_flags(jitter: Q8p8, lat_p95: Q8p8) -> PaceFlags {
    let mut flags = PaceFlags::NONE;
    if jitter > MICRO_STUTTER_JITTER {
        flags = flags.union(PaceFlags::MICRO_STUTTER);
    }
    if jitter > PACING_JITTER {
        flags = flags.union(PaceFlags::PACING);
    }
    if lat_p95 > INPUT_LAG_LATENCY {
        flags = flags.union(PaceFlags::INPUT_LAG);
    }
    flags
}

/// Highest-priority remediation for a set of raised conditions.
fn advice_for(flags: PaceFlags) -> Option<&'static str> {
    if flags.contains(PaceFlags::PACING) {
        Some("enable frame pacing or cap the frame rate to stabilize delivery")
    } else if flags.contains(PaceFlags::INPUT_LAG) {
        Some("reduce frames queued ahead of display to shorten the input path")
    } else if flags.contains(PaceFlags::MICRO_STUTTER) {
        Some("smooth per-frame workload spikes to settle residual stutter")
    } else {
        None
    }
}
