//! Pin-flat detection, start/cup placement, difficulty classification, and playability
//! validation.
//!
//! Everything here is a pure function of already-generated surface data; the only
//! randomness is the seeded choice among qualifying start/cup pairs.
use std::f32::consts::TAU;

use glam::Vec2;

use crate::surface::Heightfield;

pub mod difficulty;
pub mod pins;
pub mod planner;
pub mod validation;

pub use difficulty::{classify_difficulty, DifficultyRating, DifficultyTier};
pub use pins::{detect_pin_flats, PinCandidate, PinFlatConfig};
pub use planner::{plan_placement, PlacementConfig, StartCupPlacement};
pub use validation::{
    path_max_slope, validate_green, RuleResult, ValidationConfig, ValidationReport,
    ValidationRule,
};

const RING_SAMPLES: usize = 8;

/// Mean slope in percent over `center` and eight points on a ring of `radius`.
///
/// Returns `None` when any of those points is off the green, so edge samples never see
/// the sentinel height.
pub fn average_slope_percent(field: &Heightfield, center: Vec2, radius: f32) -> Option<f32> {
    let mut total = 0.0;
    for i in 0..=RING_SAMPLES {
        let p = if i == RING_SAMPLES {
            center
        } else {
            center + Vec2::from_angle(TAU * i as f32 / RING_SAMPLES as f32) * radius
        };
        field.try_height_at(p)?;
        total += field.slope_percent_at(p);
    }
    Some(total / (RING_SAMPLES + 1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{generate_outline, OutlineShape, OutlineSpec, SdfTexture};

    #[test]
    fn average_slope_requires_every_ring_point_on_green() {
        let spec = OutlineSpec::new(OutlineShape::Round, Vec2::new(3.0, 3.0)).with_jitter(0.0);
        let outline = generate_outline(0, &spec).unwrap();
        let sdf = SdfTexture::build(&outline, 33, 8.0).unwrap();
        let field = Heightfield::from_fn(&sdf, |p| 1.0 + 0.05 * p.x).unwrap();
        let avg = average_slope_percent(&field, Vec2::ZERO, 0.5).unwrap();
        assert!((avg - 5.0).abs() < 0.01);
        assert!(average_slope_percent(&field, Vec2::new(2.8, 0.0), 0.5).is_none());
    }
}
