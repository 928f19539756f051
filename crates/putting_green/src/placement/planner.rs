//! Start and cup placement from detected pin flats.
use glam::Vec2;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::pins::PinCandidate;
use crate::error::{ensure_positive, Error, Result};
use crate::surface::GreenOutline;

/// Allowed start-to-cup distance range, in metres.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            max_distance: 12.0,
        }
    }
}

impl PlacementConfig {
    pub fn new(min_distance: f32, max_distance: f32) -> Self {
        Self {
            min_distance,
            max_distance,
        }
    }

    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min_distance && distance <= self.max_distance
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("placement.min_distance", self.min_distance)?;
        ensure_positive("placement.max_distance", self.max_distance)?;
        if self.min_distance > self.max_distance {
            return Err(Error::InvalidConfig(format!(
                "placement range {}..={} is empty",
                self.min_distance, self.max_distance
            )));
        }
        Ok(())
    }
}

/// Chosen start and cup positions on the green plane.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartCupPlacement {
    pub start: Vec2,
    pub cup: Vec2,
    pub distance: f32,
    /// Set when too few flats qualified and the positions come from the outline's longest
    /// chord instead.
    pub degraded: bool,
}

impl StartCupPlacement {
    /// A host-chosen placement.
    pub fn explicit(
        start: impl Into<mint::Vector2<f32>>,
        cup: impl Into<mint::Vector2<f32>>,
    ) -> Self {
        let start: Vec2 = start.into().into();
        let cup: Vec2 = cup.into().into();
        Self {
            start,
            cup,
            distance: start.distance(cup),
            degraded: false,
        }
    }

    /// Unit vector from start toward the cup, or zero if they coincide.
    pub fn aim_direction(&self) -> Vec2 {
        (self.cup - self.start).normalize_or_zero()
    }
}

/// Picks a start/cup pair among `candidates` whose separation lies in the configured range.
///
/// Every ordered pair in range is equally likely. When no pair qualifies the two most
/// separated candidates are used; with fewer than two candidates the positions fall back to
/// the 25% and 75% points of the outline's longest chord. Both fallbacks are marked
/// degraded.
pub fn plan_placement<R: Rng>(
    candidates: &[PinCandidate],
    outline: &GreenOutline,
    config: &PlacementConfig,
    rng: &mut R,
) -> StartCupPlacement {
    if candidates.len() < 2 {
        warn!(
            "Only {} pin flats for placement; using the longest chord.",
            candidates.len()
        );
        return chord_fallback(outline);
    }

    let mut in_range = Vec::new();
    for (i, a) in candidates.iter().enumerate() {
        for (j, b) in candidates.iter().enumerate() {
            if i != j && config.contains(a.center.distance(b.center)) {
                in_range.push((i, j));
            }
        }
    }

    let degraded = in_range.is_empty();
    let (start, cup) = if degraded {
        warn!("No pin-flat pair within placement range; using the most separated pair.");
        most_separated(candidates)
    } else {
        let pick = (rng.next_u32() as usize) % in_range.len();
        in_range[pick]
    };

    let start = candidates[start].center;
    let cup = candidates[cup].center;
    let placement = StartCupPlacement {
        start,
        cup,
        distance: start.distance(cup),
        degraded,
    };
    debug!("Placed start and cup {:.2} m apart.", placement.distance);
    placement
}

fn most_separated(candidates: &[PinCandidate]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_d2 = -1.0;
    for (i, a) in candidates.iter().enumerate() {
        for (j, b) in candidates.iter().enumerate().skip(i + 1) {
            let d2 = a.center.distance_squared(b.center);
            if d2 > best_d2 {
                best_d2 = d2;
                best = (i, j);
            }
        }
    }
    best
}

fn chord_fallback(outline: &GreenOutline) -> StartCupPlacement {
    let (a, b) = outline.longest_chord();
    let start = a.lerp(b, 0.25);
    let cup = a.lerp(b, 0.75);
    StartCupPlacement {
        start,
        cup,
        distance: start.distance(cup),
        degraded: true,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::surface::{generate_outline, OutlineShape, OutlineSpec};

    fn outline() -> GreenOutline {
        let spec = OutlineSpec::new(OutlineShape::Oval, Vec2::new(5.0, 3.0)).with_jitter(0.0);
        generate_outline(0, &spec).unwrap()
    }

    fn pin(x: f32, z: f32) -> PinCandidate {
        PinCandidate {
            center: Vec2::new(x, z),
            radius: 0.6,
            average_slope_percent: 1.0,
        }
    }

    #[test]
    fn chosen_pair_respects_distance_range() {
        let pins = [pin(-4.0, 0.0), pin(-3.5, 0.5), pin(0.0, 0.0), pin(3.5, 0.0)];
        let config = PlacementConfig::default();
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = plan_placement(&pins, &outline(), &config, &mut rng);
            assert!(config.contains(p.distance), "distance {}", p.distance);
            assert!(!p.degraded);
            assert_ne!(p.start, p.cup);
        }
    }

    #[test]
    fn same_seed_gives_same_pair() {
        let pins = [pin(-4.0, 0.0), pin(0.0, 2.0), pin(0.0, -2.0), pin(4.0, 0.0)];
        let config = PlacementConfig::default();
        let a = plan_placement(&pins, &outline(), &config, &mut StdRng::seed_from_u64(9));
        let b = plan_placement(&pins, &outline(), &config, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn single_candidate_falls_back_to_chord() {
        let o = outline();
        let mut rng = StdRng::seed_from_u64(1);
        let p = plan_placement(&[pin(0.0, 0.0)], &o, &PlacementConfig::default(), &mut rng);
        assert!(p.degraded);
        assert!(o.contains(p.start) && o.contains(p.cup));
        assert!((p.distance - 5.0).abs() < 0.1);
    }

    #[test]
    fn out_of_range_pairs_degrade_to_most_separated() {
        let pins = [pin(0.0, 0.0), pin(0.5, 0.0), pin(1.5, 0.0)];
        let mut rng = StdRng::seed_from_u64(3);
        let p = plan_placement(&pins, &outline(), &PlacementConfig::default(), &mut rng);
        assert!(p.degraded);
        assert!((p.distance - 1.5).abs() < 1e-5);
    }

    #[test]
    fn explicit_placement_accepts_mint_vectors() {
        let p = StartCupPlacement::explicit(mint::Vector2 { x: 0.0, y: 0.0 }, Vec2::new(3.0, 4.0));
        assert_eq!(p.distance, 5.0);
        assert!(p.aim_direction().abs_diff_eq(Vec2::new(0.6, 0.8), 1e-6));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        assert!(PlacementConfig::new(5.0, 2.0).validate().is_err());
    }
}
