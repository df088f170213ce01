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

//! Offline re-analysis of recorded sessions.
//!
//! [`analyze`] reads a `.gfs` file, replays its rows through a fresh
//! [`GfContext`] under the recorded configuration, and folds the result
//! into a [`GfrReport`]: the same numbers the live context reported,
//! carried both as raw fixed-point values and as floats a human can
//! read. [`write_report`] renders the report as pretty-printed JSON.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::session::read_session;
use gf_core::{GfConfig, GfMetrics};
use gf_metrics::session::SessionMark;
use gf_metrics::GfContext;

/// Metric values exactly as the engine produced them, in their native
/// fixed-point encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// 95th-percentile frame time, Q8.8 raw.
    pub ft_p95_q8: u16,
    /// 95th-percentile input latency, Q8.8 raw.
    pub lat_p95_q8: u16,
    /// Allan-deviation jitter, Q8.8 raw.
    pub jitter_q8: u16,
    /// Drop-rate EMA, Q8.8 raw fraction of 1.0.
    pub drop_rate_q8: u16,
    /// Penalized FPS estimate, Q8.8 scale in 32 bits.
    pub fps_q8: u32,
}

impl RawMetrics {
    fn of(metrics: &GfMetrics) -> Self {
        Self {
            ft_p95_q8: metrics.ft_p95.raw(),
            lat_p95_q8: metrics.lat_p95.raw(),
            jitter_q8: metrics.jitter.raw(),
            drop_rate_q8: metrics.drop_rate.raw(),
            fps_q8: metrics.fps,
        }
    }
}

/// The same metric values converted to plain units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatMetrics {
    /// 95th-percentile frame time in milliseconds.
    pub ft_p95_ms: f32,
    /// 95th-percentile input latency in milliseconds.
    pub lat_p95_ms: f32,
    /// Allan-deviation jitter in milliseconds.
    pub jitter_ms: f32,
    /// Drop-rate EMA as a percentage.
    pub drop_rate_pct: f32,
    /// Penalized FPS estimate.
    pub fps: f32,
}

impl FloatMetrics {
    fn of(metrics: &GfMetrics) -> Self {
        Self {
            ft_p95_ms: metrics.ft_p95.to_ms(),
            lat_p95_ms: metrics.lat_p95.to_ms(),
            jitter_ms: metrics.jitter.to_ms(),
            drop_rate_pct: f32::from(metrics.drop_rate.raw()) * 100.0 / 256.0,
            fps: metrics.fps_f32(),
        }
    }
}

/// Everything a recorded session amounts to, ready for JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GfrReport {
    /// Configuration the session ran under.
    pub config: GfConfig,
    /// Lifetime count of ingested frames.
    pub frames_total: u64,
    /// Lifetime count of dropped frames.
    pub drops_total: u64,
    /// Smoothness index, within [0, 100].
    pub index: u16,
    /// Names of the raised condition flags.
    pub flags: Vec<String>,
    /// Metrics in their native fixed-point encodings.
    pub raw: RawMetrics,
    /// Metrics converted to plain units.
    pub float: FloatMetrics,
    /// Advisory hint for the dominant raised condition, if any.
    pub hint: Option<String>,
    /// Marks placed during the run, in placement order.
    pub marks: Vec<SessionMark>,
}

/// Reads the session at `path` and re-analyzes it into a report.
///
/// The rows replay through a fresh context under the recorded
/// configuration. A session with no retained rows has nothing to
/// analyze and fails with the replay error.
pub fn analyze(path: &Path) -> ReportResult<GfrReport> {
    let snapshot = read_session(path)?;
    let mut context = GfContext::from_snapshot(&snapshot)?;
    let metrics = context.metrics()?;
    let hint = context.hint()?;

    info!(
        "analyzed {}: index {} over {} frames",
        path.display(),
        metrics.index,
        context.frames_total()
    );

    Ok(GfrReport {
        config: snapshot.config,
        frames_total: context.frames_total(),
        drops_total: context.drops_total(),
        index: metrics.index,
        flags: metrics.flags.names().iter().map(|n| n.to_string()).collect(),
        raw: RawMetrics::of(&metrics),
        float: FloatMetrics::of(&metrics),
        hint: hint.map(str::to_string),
        marks: snapshot.marks,
    })
}

/// Renders `report` as pretty-printed JSON at `path`.
pub fn write_report(report: &GfrReport, path: &Path) -> ReportResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(ReportError::ReportWrite)?;
    info!("wrote report {}", path.display());
    Ok(())
}

/// Analyzes the session at `session_path`, writes the JSON report at
/// `report_path`, and hands the report back.
pub fn analyze_to_report(session_path: &Path, report_path: &Path) -> ReportResult<GfrReport> {
    let report = analyze(session_path)?;
    write_report(&report, report_path)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::{PaceFlags, Q8p8};

    #[test]
    fn test_float_metrics_convert_the_fixed_point_values() {
        let metrics = GfMetrics {
            index: 86,
            flags: PaceFlags::NONE,
            ft_p95: Q8p8::from_raw(4096),
            lat_p95: Q8p8::from_raw(1280),
            jitter: Q8p8::ZERO,
            drop_rate: Q8p8::from_raw(64),
            fps: 15800,
        };

        let float = FloatMetrics::of(&metrics);
        assert_eq!(float.ft_p95_ms, 16.0);
        assert_eq!(float.lat_p95_ms, 5.0);
        assert_eq!(float.jitter_ms, 0.0);
        assert_eq!(float.drop_rate_pct, 25.0);
        assert!((float.fps - 61.71875).abs() < 1e-6);

        let raw = RawMetrics::of(&metrics);
        assert_eq!(raw.ft_p95_q8, 4096);
        assert_eq!(raw.fps_q8, 15800);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let metrics = GfMetrics::default();
        let report = GfrReport {
            config: GfConfig::default(),
            frames_total: 120,
            drops_total: 2,
            index: 77,
            flags: vec!["PACING".to_string()],
            raw: RawMetrics::of(&metrics),
            float: FloatMetrics::of(&metrics),
            hint: Some("enable frame pacing".to_string()),
            marks: vec![SessionMark {
                frame: 60,
                label: "midpoint".to_string(),
            }],
        };

        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: GfrReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
