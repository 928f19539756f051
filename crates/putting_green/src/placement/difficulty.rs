//! Putt difficulty: a weighted blend of distance, path slope, and surface complexity.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::planner::{PlacementConfig, StartCupPlacement};
use super::validation::{path_max_slope, ValidationConfig};
use crate::surface::{GreenSurfaceSpec, Heightfield};

const DISTANCE_WEIGHT: f32 = 0.4;
const SLOPE_WEIGHT: f32 = 0.4;
const FEATURE_WEIGHT: f32 = 0.2;
const FEATURE_KINDS: f32 = 6.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl DifficultyTier {
    /// Tier for a score in `[0, 1]`.
    pub fn from_score(score: f32) -> Self {
        if score < 0.3 {
            Self::Easy
        } else if score < 0.55 {
            Self::Medium
        } else if score < 0.75 {
            Self::Hard
        } else {
            Self::Expert
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        };
        f.write_str(name)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyRating {
    pub score: f32,
    pub tier: DifficultyTier,
    pub distance_term: f32,
    pub slope_term: f32,
    pub feature_term: f32,
}

/// Rates the putt described by `placement`.
///
/// Each term is normalised to `[0, 1]`: distance against the placement maximum, the
/// steepest slope on the direct line against the green's slope cap, and the number of
/// enabled surface features against the six available kinds.
pub fn classify_difficulty(
    field: &Heightfield,
    placement: &StartCupPlacement,
    surface: &GreenSurfaceSpec,
    placement_config: &PlacementConfig,
    validation: &ValidationConfig,
) -> DifficultyRating {
    let distance_term = (placement.distance / placement_config.max_distance).clamp(0.0, 1.0);
    let path = path_max_slope(field, placement.start, placement.cup, validation.path_samples)
        .unwrap_or(validation.slope_cap_percent);
    let slope_term = (path / validation.slope_cap_percent).clamp(0.0, 1.0);
    let feature_term = (surface.active_feature_count() as f32 / FEATURE_KINDS).clamp(0.0, 1.0);

    let score = DISTANCE_WEIGHT * distance_term
        + SLOPE_WEIGHT * slope_term
        + FEATURE_WEIGHT * feature_term;
    DifficultyRating {
        score,
        tier: DifficultyTier::from_score(score),
        distance_term,
        slope_term,
        feature_term,
    }
}
