//! Playability validation of a generated green.
//!
//! Findings are data: a failed rule never aborts generation, it is reported in the
//! [`ValidationReport`] so hosts can decide whether to regenerate.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::average_slope_percent;
use super::planner::{PlacementConfig, StartCupPlacement};
use crate::error::{ensure_positive, Error, Result};
use crate::surface::Heightfield;

const SLOPE_TOLERANCE: f32 = 1e-3;

/// Thresholds for [`validate_green`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationConfig {
    /// Radius around the cup whose average slope must stay under `cup_max_slope_percent`.
    pub cup_area_radius: f32,
    pub cup_max_slope_percent: f32,
    /// Steepest slope allowed anywhere on the green.
    pub slope_cap_percent: f32,
    /// Steepest slope allowed along the straight start-to-cup line.
    pub path_max_slope_percent: f32,
    pub path_samples: usize,
    pub min_pin_flats: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cup_area_radius: 0.6,
            cup_max_slope_percent: 3.0,
            slope_cap_percent: 30.0,
            path_max_slope_percent: 20.0,
            path_samples: 32,
            min_pin_flats: 2,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("validation.cup_area_radius", self.cup_area_radius)?;
        ensure_positive("validation.cup_max_slope_percent", self.cup_max_slope_percent)?;
        ensure_positive("validation.slope_cap_percent", self.slope_cap_percent)?;
        ensure_positive("validation.path_max_slope_percent", self.path_max_slope_percent)?;
        if self.path_samples < 2 {
            return Err(Error::InvalidConfig(
                "validation.path_samples must be >= 2".into(),
            ));
        }
        Ok(())
    }
}

/// A single playability check.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValidationRule {
    /// Start-to-cup distance lies in the placement range.
    PlacementDistance,
    /// Placement came from pin flats rather than the chord fallback.
    PlacementQuality,
    /// The area around the cup is flat enough to hold a ball.
    CupStability,
    /// No slope on the green exceeds the cap.
    SlopeCap,
    /// The straight line to the cup stays on the green and under the path slope limit.
    PathFeasibility,
    /// Enough pin flats were found.
    PinFlatCount,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleResult {
    pub rule: ValidationRule,
    pub passed: bool,
    pub measured: f32,
    pub limit: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub results: Vec<RuleResult>,
}

impl ValidationReport {
    pub fn is_playable(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn result(&self, rule: ValidationRule) -> Option<&RuleResult> {
        self.results.iter().find(|r| r.rule == rule)
    }
}

/// Steepest slope in percent over `samples` evenly spaced points from `start` to `end`.
///
/// Returns `None` if the line leaves the green.
pub fn path_max_slope(field: &Heightfield, start: Vec2, end: Vec2, samples: usize) -> Option<f32> {
    let steps = samples.max(2);
    let mut max: f32 = 0.0;
    for i in 0..steps {
        let p = start.lerp(end, i as f32 / (steps - 1) as f32);
        if !field.is_on_green(p) {
            return None;
        }
        max = max.max(field.slope_percent_at(p));
    }
    Some(max)
}

/// Runs every [`ValidationRule`] against a placed green.
pub fn validate_green(
    field: &Heightfield,
    placement: &StartCupPlacement,
    pin_flat_count: usize,
    placement_config: &PlacementConfig,
    config: &ValidationConfig,
) -> ValidationReport {
    let mut results = Vec::with_capacity(6);

    results.push(RuleResult {
        rule: ValidationRule::PlacementDistance,
        passed: placement_config.contains(placement.distance),
        measured: placement.distance,
        limit: placement_config.max_distance,
    });

    results.push(RuleResult {
        rule: ValidationRule::PlacementQuality,
        passed: !placement.degraded,
        measured: if placement.degraded { 1.0 } else { 0.0 },
        limit: 0.0,
    });

    let cup_slope = average_slope_percent(field, placement.cup, config.cup_area_radius)
        .unwrap_or(f32::INFINITY);
    results.push(RuleResult {
        rule: ValidationRule::CupStability,
        passed: cup_slope <= config.cup_max_slope_percent,
        measured: cup_slope,
        limit: config.cup_max_slope_percent,
    });

    let max_slope = field.max_slope_percent();
    results.push(RuleResult {
        rule: ValidationRule::SlopeCap,
        passed: max_slope <= config.slope_cap_percent + SLOPE_TOLERANCE,
        measured: max_slope,
        limit: config.slope_cap_percent,
    });

    let path = path_max_slope(field, placement.start, placement.cup, config.path_samples)
        .unwrap_or(f32::INFINITY);
    results.push(RuleResult {
        rule: ValidationRule::PathFeasibility,
        passed: path <= config.path_max_slope_percent,
        measured: path,
        limit: config.path_max_slope_percent,
    });

    results.push(RuleResult {
        rule: ValidationRule::PinFlatCount,
        passed: pin_flat_count >= config.min_pin_flats,
        measured: pin_flat_count as f32,
        limit: config.min_pin_flats as f32,
    });

    let report = ValidationReport { results };
    debug!(
        "Validation finished: {} of {} rules failed.",
        report.failures().count(),
        report.results.len()
    );
    report
}
