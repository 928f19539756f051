#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec2;
use putting_green::surface::{OutlineShape, OutlineSpec};

pub const BENCH_SEED: u64 = 0x5EED;

/// Kidney green about 14 m x 10 m, large enough for every placement path.
pub fn bench_outline() -> OutlineSpec {
    OutlineSpec::new(OutlineShape::Kidney, Vec2::new(7.0, 5.0))
}

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(15)
        .warm_up_time(Duration::from_millis(750))
        .measurement_time(Duration::from_secs(3))
}

/// Throughput in samples or steps; never zero so criterion can report a rate.
pub fn per_element(count: usize) -> Throughput {
    Throughput::Elements(count.max(1) as u64)
}
