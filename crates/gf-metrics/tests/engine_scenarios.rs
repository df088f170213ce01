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

use gf_core::{FrameSample, GfConfig, GfError, PaceFlags, Q8p8, Status};
use gf_metrics::GfContext;

fn sample(frame_ms: f32, latency_ms: f32) -> FrameSample {
    FrameSample::from_times(Q8p8::from_ms(frame_ms), Q8p8::from_ms(latency_ms))
}

#[test]
fn test_steady_session_scores_above_eighty() {
    // --- 1. ARRANGE ---
    // A context at the default 60 FPS target, fed a perfectly steady
    // two seconds of 16 ms frames with low latency.
    let mut ctx = GfContext::new(GfConfig::default()).expect("default config should build");
    for _ in 0..120 {
        ctx.update(sample(16.0, 5.0));
    }

    // --- 2. ACT ---
    let metrics = ctx.metrics().expect("window is populated");

    // --- 3. ASSERT ---
    assert!(
        metrics.index > 80,
        "steady on-target session should score high, got {}",
        metrics.index
    );
    assert!(
        metrics.flags.is_empty(),
        "no condition should be raised, got {:?}",
        metrics.flags.names()
    );
    assert_eq!(metrics.jitter, Q8p8::ZERO, "constant frames carry no jitter");
    assert_eq!(metrics.drop_rate, Q8p8::ZERO);
    assert_eq!(ctx.drops_total(), 0);
    // 62.5 FPS base, shaved slightly by the 5 ms latency discount.
    let fps = metrics.fps_f32();
    assert!(
        (60.0..=62.5).contains(&fps),
        "estimate should sit near the measured rate, got {fps}"
    );
    assert_eq!(
        ctx.hint().expect("window is populated"),
        None,
        "a smooth session needs no remediation"
    );
}

#[test]
fn test_stutter_burst_collapses_the_index() {
    // --- 1. ARRANGE ---
    // The same steady session, then a single 100 ms hitch.
    let mut ctx = GfContext::new(GfConfig::default()).expect("default config should build");
    for _ in 0..120 {
        ctx.update(sample(16.0, 5.0));
    }
    let before = ctx.metrics().expect("window is populated");

    // --- 2. ACT ---
    ctx.update(sample(100.0, 5.0));
    let after = ctx.metrics().expect("window is populated");

    // --- 3. ASSERT ---
    // One hitch in two seconds: the jitter estimator catches it even
    // though the 95th-percentile frame time does not move.
    assert_eq!(after.ft_p95, before.ft_p95, "p95 should shrug off one outlier");
    assert!(
        after.jitter.to_ms() > 4.0,
        "the hitch should register as pacing-level jitter, got {} ms",
        after.jitter.to_ms()
    );
    assert!(after.flags.contains(PaceFlags::PACING));
    assert!(after.flags.contains(PaceFlags::MICRO_STUTTER));
    assert!(!after.flags.contains(PaceFlags::INPUT_LAG));
    assert_eq!(ctx.drops_total(), 1, "the hitch crossed the drop threshold");
    assert!(after.drop_rate > Q8p8::ZERO);
    assert!(
        after.index < 40,
        "index should collapse after the hitch, got {} (was {})",
        after.index,
        before.index
    );
    let advice = ctx
        .hint()
        .expect("window is populated")
        .expect("pacing trouble should produce advice");
    assert!(
        advice.contains("pacing"),
        "pacing outranks the other conditions, got {advice:?}"
    );
}

#[test]
fn test_empty_context_fails_and_records_the_failure() {
    // --- 1. ARRANGE ---
    let mut ctx = GfContext::new(GfConfig::default()).expect("default config should build");

    // --- 2. ACT ---
    let result = ctx.metrics();

    // --- 3. ASSERT ---
    assert_eq!(result, Err(GfError::EmptyWindow));
    let record = ctx.last_error().expect("the failure should be recorded");
    assert_eq!(record.status, Status::ENGINE_EMPTY);
    assert_eq!(record.origin, "gf_ctx");
    // The record renders as a one-line diagnostic.
    let line = record.to_string();
    assert!(line.contains("ENGINE_EMPTY"), "unexpected rendering: {line}");
}

#[test]
fn test_auxiliary_sample_fields_never_influence_metrics() {
    // --- 1. ARRANGE ---
    // Two contexts fed identical timings; one also carries heavy
    // renderer-side telemetry in the auxiliary fields.
    let mut plain = GfContext::new(GfConfig::default()).expect("default config should build");
    let mut loaded = GfContext::new(GfConfig::default()).expect("default config should build");

    // --- 2. ACT ---
    for i in 0..90u32 {
        let frame_ms = if i % 11 == 0 { 24.0 } else { 16.0 };
        plain.update(sample(frame_ms, 8.0));
        loaded.update(FrameSample {
            draw_calls: 40_000 + i,
            visible_objects: 1_000_000,
            camera_motion: [3.5, -7.25],
            ..sample(frame_ms, 8.0)
        });
    }

    // --- 3. ASSERT ---
    assert_eq!(
        plain.metrics().expect("window is populated"),
        loaded.metrics().expect("window is populated"),
        "auxiliary fields must be inert"
    );
}

#[test]
fn test_overloaded_session_bottoms_out_without_underflow() {
    // --- 1. ARRANGE ---
    // A session pinned at 4 FPS with a 200 ms input path: every frame
    // drops and every discount applies at once.
    let mut ctx = GfContext::new(GfConfig::default()).expect("default config should build");
    for _ in 0..120 {
        ctx.update(sample(250.0, 200.0));
    }

    // --- 2. ACT ---
    let metrics = ctx.metrics().expect("window is populated");

    // --- 3. ASSERT ---
    assert_eq!(metrics.index, 0, "the index floors at zero, never wraps");
    assert!(metrics.flags.contains(PaceFlags::INPUT_LAG));
    assert!(
        !metrics.flags.contains(PaceFlags::PACING),
        "steady slowness is not a pacing problem"
    );
    assert_eq!(ctx.drops_total(), 120);
    let advice = ctx
        .hint()
        .expect("window is populated")
        .expect("input lag should produce advice");
    assert!(advice.contains("input"), "got {advice:?}");
}
