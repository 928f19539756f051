//! Elevation feature terms.
//!
//! Each term is a pure function of a planar position, the generation seed, and the
//! [`FeatureContext`] describing where the green sits; the synthesiser sums them.
use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::seed::{signed_unit, unit, Stream};
use super::spec::{
    CrownParams, FalseFrontParams, GreenSurfaceSpec, RidgeParams, SwaleParams, TierParams,
    UndulationParams,
};

/// Placement frame for features: the green's centroid and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureContext {
    pub center: Vec2,
    pub radius: f32,
    pub seed: u64,
}

impl FeatureContext {
    pub fn new(center: Vec2, radius: f32, seed: u64) -> Self {
        Self {
            center,
            radius,
            seed,
        }
    }

    fn scatter_point(&self, stream: Stream, index: u64, spread: f32) -> Vec2 {
        self.center
            + Vec2::new(
                signed_unit(self.seed, stream, index, 0),
                signed_unit(self.seed, stream, index, 1),
            ) * self.radius
                * spread
    }
}

/// Planar base slope: falls by `percent / 100` per metre along `direction`.
pub fn base_plane(p: Vec2, ctx: &FeatureContext, spec: &GreenSurfaceSpec) -> f32 {
    -(spec.base_slope_percent / 100.0) * (p - ctx.center).dot(spec.base_slope_direction())
}

pub fn undulation(p: Vec2, ctx: &FeatureContext, params: &UndulationParams) -> f32 {
    let mut h = 0.0;
    for k in 0..params.count as u64 {
        let c = ctx.scatter_point(Stream::Undulation, k, 0.7);
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let t = (p.distance(c) / params.wavelength).min(1.0);
        h += sign * params.amplitude * 0.5 * (1.0 + (PI * t).cos());
    }
    let swell_dir = Vec2::from_angle(unit(ctx.seed, Stream::Undulation, u64::MAX, 0) * TAU);
    let phase = unit(ctx.seed, Stream::Undulation, u64::MAX, 1) * TAU;
    h + 0.25 * params.amplitude * (TAU * p.dot(swell_dir) / (2.0 * params.wavelength) + phase).sin()
}

pub fn tiers(p: Vec2, ctx: &FeatureContext, params: &TierParams) -> f32 {
    let dir = Vec2::from_angle(params.direction_degrees.to_radians());
    let t = (p - ctx.center).dot(dir);
    let span = 2.0 * ctx.radius;
    (0..params.count as u64)
        .map(|i| {
            let base = -ctx.radius + span * (i + 1) as f32 / (params.count + 1) as f32;
            let boundary = base + signed_unit(ctx.seed, Stream::Tiers, i, 0) * 0.15 * ctx.radius;
            params.step_height * smoothstep((t - boundary) / params.transition_width + 0.5)
        })
        .sum()
}

pub fn ridges(p: Vec2, ctx: &FeatureContext, params: &RidgeParams) -> f32 {
    (0..params.count as u64)
        .map(|k| params.height * line_profile(p, ctx, Stream::Ridges, k, params.width))
        .sum()
}

pub fn swales(p: Vec2, ctx: &FeatureContext, params: &SwaleParams) -> f32 {
    (0..params.count as u64)
        .map(|k| -params.depth * line_profile(p, ctx, Stream::Swales, k, params.width))
        .sum()
}

pub fn crown(p: Vec2, ctx: &FeatureContext, params: &CrownParams) -> f32 {
    let r = ctx.radius * params.radius_fraction;
    if r <= f32::EPSILON {
        return 0.0;
    }
    let d = p.distance(ctx.center + params.offset) / r;
    params.height * (1.0 - d * d).max(0.0)
}

pub fn false_front(p: Vec2, ctx: &FeatureContext, params: &FalseFrontParams) -> f32 {
    let dir = Vec2::from_angle(params.direction_degrees.to_radians());
    let t = (p - ctx.center).dot(dir);
    let start = ctx.radius - params.depth;
    -params.height * smoothstep((t - start) / params.depth)
}

/// Sum of every enabled optional feature at `p`.
pub fn feature_sum(p: Vec2, ctx: &FeatureContext, spec: &GreenSurfaceSpec) -> f32 {
    let mut h = 0.0;
    if let Some(u) = &spec.undulation {
        h += undulation(p, ctx, u);
    }
    if let Some(t) = &spec.tiers {
        h += tiers(p, ctx, t);
    }
    if let Some(r) = &spec.ridges {
        h += ridges(p, ctx, r);
    }
    if let Some(s) = &spec.swales {
        h += swales(p, ctx, s);
    }
    if let Some(c) = &spec.crown {
        h += crown(p, ctx, c);
    }
    if let Some(f) = &spec.false_front {
        h += false_front(p, ctx, f);
    }
    h
}

/// Gaussian cross-section around a seeded straight line through the green.
fn line_profile(p: Vec2, ctx: &FeatureContext, stream: Stream, k: u64, width: f32) -> f32 {
    let anchor = ctx.scatter_point(stream, k, 0.5);
    let dir = Vec2::from_angle(unit(ctx.seed, stream, k, 2) * PI);
    let d = dir.perp_dot(p - anchor) / width;
    (-d * d).exp()
}

/// Cubic smoothstep on `[0, 1]`.
#[inline]
pub fn smoothstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FeatureContext {
        FeatureContext::new(Vec2::ZERO, 4.0, 11)
    }

    #[test]
    fn smoothstep_is_clamped() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn base_plane_falls_along_direction() {
        let spec = GreenSurfaceSpec::flat().with_base_slope(2.0, 0.0);
        let c = ctx();
        let uphill = base_plane(Vec2::new(-1.0, 0.0), &c, &spec);
        let downhill = base_plane(Vec2::new(1.0, 0.0), &c, &spec);
        assert!((uphill - downhill - 0.04).abs() < 1e-6);
    }

    #[test]
    fn crown_peaks_at_centre_and_vanishes_outside() {
        let params = CrownParams::default();
        let c = ctx();
        assert!((crown(Vec2::ZERO, &c, &params) - params.height).abs() < 1e-6);
        assert_eq!(crown(Vec2::new(10.0, 0.0), &c, &params), 0.0);
    }

    #[test]
    fn tiers_rise_along_direction() {
        let params = TierParams {
            direction_degrees: 0.0,
            ..Default::default()
        };
        let c = ctx();
        let low = tiers(Vec2::new(-4.0, 0.0), &c, &params);
        let high = tiers(Vec2::new(4.0, 0.0), &c, &params);
        assert!(low < 1e-3);
        assert!((high - params.step_height).abs() < 1e-3);
    }

    #[test]
    fn false_front_drops_near_its_edge_only() {
        let params = FalseFrontParams {
            direction_degrees: 0.0,
            ..Default::default()
        };
        let c = ctx();
        assert_eq!(false_front(Vec2::ZERO, &c, &params), 0.0);
        assert!((false_front(Vec2::new(4.0, 0.0), &c, &params) + params.height).abs() < 1e-6);
    }

    #[test]
    fn ridges_raise_and_swales_lower() {
        let c = ctx();
        let ridge = RidgeParams::default();
        let swale = SwaleParams::default();
        let samples = (0..64).map(|i| Vec2::new(i as f32 * 0.1 - 3.2, 0.3));
        for p in samples {
            assert!(ridges(p, &c, &ridge) >= 0.0);
            assert!(swales(p, &c, &swale) <= 0.0);
        }
    }

    #[test]
    fn features_are_pure_functions_of_seed() {
        let spec = GreenSurfaceSpec::all_features();
        let p = Vec2::new(1.3, -0.7);
        assert_eq!(feature_sum(p, &ctx(), &spec), feature_sum(p, &ctx(), &spec));
        let other = FeatureContext::new(Vec2::ZERO, 4.0, 12);
        assert_ne!(feature_sum(p, &ctx(), &spec), feature_sum(p, &other, &spec));
    }
}
