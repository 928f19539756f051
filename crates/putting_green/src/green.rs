//! One-shot green generation: outline, SDF, heightfield, pin flats, placement, difficulty,
//! and validation.
//!
//! Generation is synchronous and deterministic: the same seed, specs, and configuration
//! always produce a bit-identical [`GeneratedGreen`]. A failed generation returns an error
//! and nothing partial.
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ensure_positive, Error, Result};
use crate::physics::cup::{Cup, CupConfig};
use crate::placement::{
    classify_difficulty, detect_pin_flats, plan_placement, validate_green, DifficultyRating,
    PinCandidate, PinFlatConfig, PlacementConfig, StartCupPlacement, ValidationConfig,
    ValidationReport,
};
use crate::surface::seed::{seed_for, Stream};
use crate::surface::{
    generate_outline, FeatureContext, GreenOutline, GreenSurfaceSpec, Heightfield, OutlineSpec,
    SdfTexture,
};

pub const DEFAULT_RESOLUTION: usize = 129;
/// Clearance between the outline's extent and the edge of the world square.
const WORLD_MARGIN: f32 = 1.0;

/// Grid and placement settings for [`generate_with_config`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    /// Side of the square world the rasters cover, centred on the origin.
    pub world_size: f32,
    /// Samples per side of the SDF and heightfield rasters.
    pub resolution: usize,
    pub pins: PinFlatConfig,
    pub placement: PlacementConfig,
    pub validation: ValidationConfig,
}

impl GenerationConfig {
    pub fn new(world_size: f32, resolution: usize) -> Self {
        Self {
            world_size,
            resolution,
            pins: PinFlatConfig::default(),
            placement: PlacementConfig::default(),
            validation: ValidationConfig::default(),
        }
    }

    /// A world just large enough for any outline `spec` can produce.
    pub fn for_outline(spec: &OutlineSpec, resolution: usize) -> Self {
        Self::new(2.0 * (spec.max_extent() + WORLD_MARGIN), resolution)
    }

    pub fn with_pins(mut self, pins: PinFlatConfig) -> Self {
        self.pins = pins;
        self
    }

    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution <= 1 {
            return Err(Error::InvalidResolution {
                resolution: self.resolution,
            });
        }
        ensure_positive("world_size", self.world_size)?;
        self.pins.validate()?;
        self.placement.validate()?;
        self.validation.validate()
    }
}

/// Everything generation produces for one hole. Read-only; share it freely across
/// simulation instances.
#[derive(Clone, Debug)]
pub struct GeneratedGreen {
    pub seed: u64,
    pub outline: GreenOutline,
    pub surface: GreenSurfaceSpec,
    pub sdf: SdfTexture,
    pub heightfield: Heightfield,
    pub pin_candidates: Vec<PinCandidate>,
    pub placement: StartCupPlacement,
    pub difficulty: DifficultyRating,
    pub validation: ValidationReport,
    pub config: GenerationConfig,
}

impl GeneratedGreen {
    /// A cup at the planned cup position.
    pub fn place_cup(&self, config: CupConfig) -> Cup {
        Cup::place(&self.heightfield, self.placement.cup, config)
    }

    /// Ball centre resting on the terrain at the planned start.
    pub fn start_position(&self, ball_radius: f32) -> Vec3 {
        let p = self.placement.start;
        Vec3::new(p.x, self.heightfield.height_at(p) + ball_radius, p.y)
    }

    /// Swaps in a host-chosen placement, re-running difficulty and validation for it.
    pub fn with_placement(mut self, placement: StartCupPlacement) -> Self {
        self.placement = placement;
        self.difficulty = classify_difficulty(
            &self.heightfield,
            &self.placement,
            &self.surface,
            &self.config.placement,
            &self.config.validation,
        );
        self.validation = validate_green(
            &self.heightfield,
            &self.placement,
            self.pin_candidates.len(),
            &self.config.placement,
            &self.config.validation,
        );
        self
    }

    pub fn is_on_green(&self, p: Vec2) -> bool {
        self.heightfield.is_on_green(p)
    }
}

/// Generates a green at `resolution` samples per side in a world sized to the outline.
///
/// The slope-cap validation rule uses the surface's own cap.
pub fn generate(
    seed: u64,
    outline: &OutlineSpec,
    surface: &GreenSurfaceSpec,
    resolution: usize,
) -> Result<GeneratedGreen> {
    let mut config = GenerationConfig::for_outline(outline, resolution);
    config.validation.slope_cap_percent = surface.max_slope_percent;
    generate_with_config(seed, outline, surface, &config)
}

pub fn generate_with_config(
    seed: u64,
    outline_spec: &OutlineSpec,
    surface: &GreenSurfaceSpec,
    config: &GenerationConfig,
) -> Result<GeneratedGreen> {
    config.validate()?;
    surface.validate()?;

    let outline = generate_outline(seed, outline_spec)?;
    let sdf = SdfTexture::build(&outline, config.resolution, config.world_size)?;
    let ctx = FeatureContext::new(outline.centroid(), outline.max_radius(), seed);
    let heightfield = Heightfield::synthesize(&sdf, surface, &ctx)?;

    let pin_candidates = detect_pin_flats(&heightfield, &sdf, &config.pins);
    let mut rng = StdRng::seed_from_u64(seed_for(seed, Stream::Placement, 0));
    let placement = plan_placement(&pin_candidates, &outline, &config.placement, &mut rng);
    let difficulty = classify_difficulty(
        &heightfield,
        &placement,
        surface,
        &config.placement,
        &config.validation,
    );
    let validation = validate_green(
        &heightfield,
        &placement,
        pin_candidates.len(),
        &config.placement,
        &config.validation,
    );

    if !validation.is_playable() {
        warn!(
            "Green {} failed {} validation rule(s).",
            seed,
            validation.failures().count()
        );
    }
    info!(
        "Generated green {}: {} pin flats, {:.1} m putt, {} ({:.2}).",
        seed,
        pin_candidates.len(),
        placement.distance,
        difficulty.tier,
        difficulty.score
    );

    Ok(GeneratedGreen {
        seed,
        outline,
        surface: surface.clone(),
        sdf,
        heightfield,
        pin_candidates,
        placement,
        difficulty,
        validation,
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::ValidationRule;
    use crate::surface::OutlineShape;

    fn outline() -> OutlineSpec {
        OutlineSpec::new(OutlineShape::Oval, Vec2::new(6.0, 4.5))
    }

    #[test]
    fn generation_is_deterministic() {
        let surface = GreenSurfaceSpec::all_features();
        let a = generate(42, &outline(), &surface, 65).unwrap();
        let b = generate(42, &outline(), &surface, 65).unwrap();
        assert_eq!(a.heightfield.fingerprint(), b.heightfield.fingerprint());
        assert_eq!(a.outline, b.outline);
        assert_eq!(a.placement, b.placement);
        assert_eq!(a.pin_candidates, b.pin_candidates);
        assert_eq!(a.validation, b.validation);

        let c = generate(43, &outline(), &surface, 65).unwrap();
        assert_ne!(a.heightfield.fingerprint(), c.heightfield.fingerprint());
    }

    #[test]
    fn low_resolution_fails() {
        let err = generate(1, &outline(), &GreenSurfaceSpec::default(), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidResolution { resolution: 1 }));
    }

    #[test]
    fn invalid_surface_fails() {
        let surface = GreenSurfaceSpec::default().with_noise(f32::NAN, 0.3);
        assert!(generate(1, &outline(), &surface, 33).is_err());
    }

    #[test]
    fn world_is_sized_to_the_outline() {
        let config = GenerationConfig::for_outline(&outline(), 65);
        let green = generate_with_config(7, &outline(), &GreenSurfaceSpec::default(), &config)
            .unwrap();
        let (lo, hi) = green.outline.bounds();
        let half = config.world_size * 0.5;
        assert!(lo.min_element() > -half && hi.max_element() < half);
    }

    #[test]
    fn placement_is_in_range_unless_reported() {
        let surface = GreenSurfaceSpec::default();
        for seed in 0..6 {
            let green = generate(seed, &outline(), &surface, 65).unwrap();
            let rule = green
                .validation
                .result(ValidationRule::PlacementDistance)
                .unwrap();
            let in_range = (2.0..=12.0).contains(&green.placement.distance);
            assert_eq!(rule.passed, in_range);
            assert!(green.is_on_green(green.placement.start));
            assert!(green.is_on_green(green.placement.cup));
        }
    }

    #[test]
    fn slope_cap_is_respected_and_validated() {
        let surface = GreenSurfaceSpec::all_features().with_max_slope_percent(8.0);
        let green = generate(5, &outline(), &surface, 65).unwrap();
        assert!(green.heightfield.max_slope_percent() <= 8.0 + 1e-3);
        assert!(green.validation.result(ValidationRule::SlopeCap).unwrap().passed);
    }

    #[test]
    fn explicit_placement_is_revalidated() {
        let green = generate(3, &outline(), &GreenSurfaceSpec::flat(), 65).unwrap();
        let short = StartCupPlacement::explicit(Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.0));
        let green = green.with_placement(short);
        assert!(!green.validation.result(ValidationRule::PlacementDistance).unwrap().passed);
        let cup = green.place_cup(CupConfig::default());
        assert_eq!(cup.planar_center(), Vec2::new(0.5, 0.0));
        let start = green.start_position(0.02135);
        assert!((start.y - green.heightfield.height_at(Vec2::ZERO) - 0.02135).abs() < 1e-6);
    }
}
