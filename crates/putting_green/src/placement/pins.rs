//! Pin-flat detection: low-slope regions suitable for a cup or a start position.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::average_slope_percent;
use crate::error::{ensure_positive, Error, Result};
use crate::surface::{Heightfield, SdfTexture};

const MAX_RADIUS_RINGS: usize = 4;

/// A candidate flat region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinCandidate {
    pub center: Vec2,
    /// Radius over which the neighbourhood slope stays under the detection threshold.
    pub radius: f32,
    pub average_slope_percent: f32,
}

/// Tuning for [`detect_pin_flats`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PinFlatConfig {
    /// Distance between scanned positions.
    pub sample_spacing: f32,
    /// Radius of the neighbourhood averaged at each position.
    pub window_radius: f32,
    pub max_slope_percent: f32,
    /// Required clearance from the outline.
    pub min_edge_distance: f32,
    /// Required distance between accepted candidates.
    pub min_separation: f32,
    pub min_count: usize,
    pub max_count: usize,
    /// Threshold multiplier applied when fewer than `min_count` flats are found.
    pub relax_factor: f32,
    pub relax_attempts: u32,
}

impl Default for PinFlatConfig {
    fn default() -> Self {
        Self {
            sample_spacing: 0.5,
            window_radius: 0.6,
            max_slope_percent: 3.0,
            min_edge_distance: 1.0,
            min_separation: 1.5,
            min_count: 2,
            max_count: 12,
            relax_factor: 1.5,
            relax_attempts: 3,
        }
    }
}

impl PinFlatConfig {
    pub fn with_max_slope_percent(mut self, max_slope_percent: f32) -> Self {
        self.max_slope_percent = max_slope_percent;
        self
    }

    pub fn with_count_range(mut self, min_count: usize, max_count: usize) -> Self {
        self.min_count = min_count;
        self.max_count = max_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("pins.sample_spacing", self.sample_spacing)?;
        ensure_positive("pins.window_radius", self.window_radius)?;
        ensure_positive("pins.max_slope_percent", self.max_slope_percent)?;
        ensure_positive("pins.min_separation", self.min_separation)?;
        if !self.min_edge_distance.is_finite() || self.min_edge_distance < 0.0 {
            return Err(Error::InvalidConfig(
                "pins.min_edge_distance must be finite and >= 0".into(),
            ));
        }
        if self.max_count == 0 || self.min_count > self.max_count {
            return Err(Error::InvalidConfig(format!(
                "pin count range {}..={} is empty",
                self.min_count, self.max_count
            )));
        }
        if !self.relax_factor.is_finite() || self.relax_factor < 1.0 {
            return Err(Error::InvalidConfig("pins.relax_factor must be >= 1".into()));
        }
        Ok(())
    }
}

struct ScanSample {
    center: Vec2,
    slope: f32,
    clearance: f32,
}

/// Scans `field` on a regular sub-sampling and returns deduplicated flat regions, flattest
/// first.
///
/// If fewer than `min_count` flats qualify, the slope threshold is relaxed by
/// `relax_factor` up to `relax_attempts` times before giving up with what was found.
pub fn detect_pin_flats(
    field: &Heightfield,
    sdf: &SdfTexture,
    config: &PinFlatConfig,
) -> Vec<PinCandidate> {
    let samples = scan(field, sdf, config);
    let mut threshold = config.max_slope_percent;
    let mut candidates = cluster(field, &samples, threshold, config);

    let mut attempt = 0;
    while candidates.len() < config.min_count && attempt < config.relax_attempts {
        attempt += 1;
        threshold *= config.relax_factor;
        warn!(
            "Found {} pin flats, wanted {}; relaxing slope threshold to {:.2}%.",
            candidates.len(),
            config.min_count,
            threshold
        );
        candidates = cluster(field, &samples, threshold, config);
    }
    debug!(
        "Detected {} pin flats under {:.2}% slope.",
        candidates.len(),
        threshold
    );
    candidates
}

fn scan(field: &Heightfield, sdf: &SdfTexture, config: &PinFlatConfig) -> Vec<ScanSample> {
    let world = field.world_size();
    let cells = (world / config.sample_spacing).floor().max(1.0) as usize;
    let cell = world / cells as f32;
    let half = world * 0.5;

    let mut samples = Vec::new();
    for j in 0..cells {
        for i in 0..cells {
            let center = Vec2::new(
                -half + (i as f32 + 0.5) * cell,
                -half + (j as f32 + 0.5) * cell,
            );
            let clearance = -sdf.distance_at(center);
            if clearance < config.min_edge_distance {
                continue;
            }
            if let Some(slope) = average_slope_percent(field, center, config.window_radius) {
                samples.push(ScanSample {
                    center,
                    slope,
                    clearance,
                });
            }
        }
    }
    samples.sort_by(|a, b| {
        a.slope
            .total_cmp(&b.slope)
            .then(a.center.x.total_cmp(&b.center.x))
            .then(a.center.y.total_cmp(&b.center.y))
    });
    samples
}

fn cluster(
    field: &Heightfield,
    samples: &[ScanSample],
    threshold: f32,
    config: &PinFlatConfig,
) -> Vec<PinCandidate> {
    let mut accepted: Vec<PinCandidate> = Vec::new();
    for s in samples.iter().take_while(|s| s.slope < threshold) {
        if accepted.len() >= config.max_count {
            break;
        }
        let min_sep2 = config.min_separation * config.min_separation;
        if accepted
            .iter()
            .any(|c| c.center.distance_squared(s.center) < min_sep2)
        {
            continue;
        }
        accepted.push(PinCandidate {
            center: s.center,
            radius: flat_radius(field, s, threshold, config),
            average_slope_percent: s.slope,
        });
    }
    accepted
}

fn flat_radius(field: &Heightfield, s: &ScanSample, threshold: f32, config: &PinFlatConfig) -> f32 {
    let mut radius = config.window_radius.min(s.clearance);
    for k in 1..=MAX_RADIUS_RINGS {
        let r = config.window_radius + k as f32 * config.sample_spacing;
        if r > s.clearance {
            break;
        }
        match average_slope_percent(field, s.center, r) {
            Some(avg) if avg < threshold => radius = r,
            _ => break,
        }
    }
    radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{generate_outline, OutlineShape, OutlineSpec};

    fn setup() -> SdfTexture {
        let spec = OutlineSpec::new(OutlineShape::Oval, Vec2::new(4.5, 3.5)).with_jitter(0.0);
        let outline = generate_outline(2, &spec).unwrap();
        SdfTexture::build(&outline, 65, 10.0).unwrap()
    }

    #[test]
    fn flat_green_yields_separated_candidates_within_cap() {
        let sdf = setup();
        let field = Heightfield::flat(&sdf);
        let config = PinFlatConfig::default();
        let pins = detect_pin_flats(&field, &sdf, &config);
        assert!(pins.len() >= config.min_count);
        assert!(pins.len() <= config.max_count);
        for (i, a) in pins.iter().enumerate() {
            assert!(sdf.distance_at(a.center) <= -config.min_edge_distance);
            assert_eq!(a.average_slope_percent, 0.0);
            assert!(a.radius >= config.window_radius);
            for b in &pins[i + 1..] {
                assert!(a.center.distance(b.center) >= config.min_separation);
            }
        }
    }

    #[test]
    fn steep_half_is_excluded() {
        let sdf = setup();
        // Flat for x < 0, 8% slope for x >= 0.
        let field = Heightfield::from_fn(&sdf, |p| 1.0 + 0.08 * p.x.max(0.0)).unwrap();
        let pins = detect_pin_flats(&field, &sdf, &PinFlatConfig::default());
        assert!(!pins.is_empty());
        assert!(pins.iter().all(|p| p.center.x < 0.0));
    }

    #[test]
    fn threshold_relaxes_when_too_few_flats() {
        let sdf = setup();
        let field = Heightfield::from_fn(&sdf, |p| 1.0 + 0.035 * p.x).unwrap();
        let strict = PinFlatConfig::default().with_count_range(2, 6);
        let pins = detect_pin_flats(&field, &sdf, &strict);
        // 3.5% everywhere fails 3% but passes 4.5% after one relaxation.
        assert!(pins.len() >= 2);
        assert!(pins.iter().all(|p| (p.average_slope_percent - 3.5).abs() < 0.05));
    }

    #[test]
    fn validate_rejects_empty_count_range() {
        assert!(PinFlatConfig::default().with_count_range(5, 2).validate().is_err());
        assert!(PinFlatConfig::default().validate().is_ok());
    }
}
