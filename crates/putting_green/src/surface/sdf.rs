//! Signed-distance field rasterised from a [`GreenOutline`].
//!
//! The SDF is the single authority for "is this point part of the green": negative values
//! are inside the outline, positive values outside. Every later stage (heightfield masking,
//! pin-flat edge clearance, the simulator's on-green checks) reads it.
use glam::Vec2;

use super::grid::Grid;
use super::outline::{point_segment_distance, GreenOutline};
use super::raster::Raster;
use crate::error::{Error, Result};

/// Square grid of signed distances to a green outline.
#[derive(Clone, Debug, PartialEq)]
pub struct SdfTexture {
    raster: Raster,
}

impl SdfTexture {
    /// Rasterises `outline` onto a `resolution × resolution` lattice covering a square of
    /// side `world_size` centred on the origin.
    pub fn build(outline: &GreenOutline, resolution: usize, world_size: f32) -> Result<Self> {
        let grid = Grid::new(resolution, world_size)?;
        let (lo, hi) = outline.bounds();
        if !grid.contains(lo) || !grid.contains(hi) {
            return Err(Error::DegenerateOutline(format!(
                "outline bounds [{lo}, {hi}] do not fit inside a world of size {world_size}"
            )));
        }

        let edges: Vec<(Vec2, Vec2)> = outline.edges().collect();
        let raster = Raster::from_fn(grid, |_, _, p| {
            let d = edges
                .iter()
                .map(|(a, b)| point_segment_distance(p, *a, *b))
                .fold(f32::INFINITY, f32::min);
            if outline.contains(p) {
                -d
            } else {
                d
            }
        });
        Ok(Self { raster })
    }

    pub fn grid(&self) -> Grid {
        self.raster.grid
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn resolution(&self) -> usize {
        self.raster.grid.resolution
    }

    pub fn world_size(&self) -> f32 {
        self.raster.grid.world_size
    }

    /// Stored signed distance at sample `(ix, iz)`.
    pub fn sample(&self, ix: usize, iz: usize) -> f32 {
        self.raster.data[self.raster.grid.index(ix, iz)]
    }

    /// Returns `true` if sample `(ix, iz)` lies strictly inside the outline.
    pub fn is_inside_sample(&self, ix: usize, iz: usize) -> bool {
        self.sample(ix, iz) < 0.0
    }

    /// Bilinearly interpolated signed distance at `p`. Points off the lattice report the
    /// clamped edge value plus their distance to the lattice, so they are always outside.
    pub fn distance_at(&self, p: Vec2) -> f32 {
        let d = self.raster.sample_bilinear(p);
        let half = self.world_size() * 0.5;
        let overshoot = (p.abs() - Vec2::splat(half)).max(Vec2::ZERO).length();
        if overshoot > 0.0 {
            d.max(0.0) + overshoot
        } else {
            d
        }
    }

    /// Returns `true` if `p` is on the green.
    pub fn contains(&self, p: Vec2) -> bool {
        self.distance_at(p) < 0.0
    }

    /// Number of inside samples.
    pub fn inside_count(&self) -> usize {
        self.raster.data.iter().filter(|d| **d < 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::surface::outline::{generate_outline, OutlineShape, OutlineSpec};

    fn oval() -> GreenOutline {
        let spec = OutlineSpec::new(OutlineShape::Oval, Vec2::new(4.0, 3.0)).with_jitter(0.0);
        generate_outline(5, &spec).unwrap()
    }

    #[test]
    fn centre_is_inside_and_corners_outside() {
        let sdf = SdfTexture::build(&oval(), 65, 10.0).unwrap();
        assert!(sdf.contains(Vec2::ZERO));
        assert!(sdf.distance_at(Vec2::ZERO) < -2.5);
        assert!(!sdf.contains(Vec2::new(4.9, 4.9)));
        assert!(!sdf.contains(Vec2::new(50.0, 0.0)));
        assert!(sdf.inside_count() > 0);
    }

    #[test]
    fn rejects_outline_larger_than_world() {
        assert!(matches!(
            SdfTexture::build(&oval(), 33, 6.0),
            Err(Error::DegenerateOutline(_))
        ));
    }

    #[test]
    fn rejects_degenerate_resolution() {
        assert!(matches!(
            SdfTexture::build(&oval(), 1, 10.0),
            Err(Error::InvalidResolution { .. })
        ));
    }

    #[test]
    fn samples_match_polygon_containment() {
        let outline = oval();
        let sdf = SdfTexture::build(&outline, 49, 10.0).unwrap();
        let grid = sdf.grid();
        for (ix, iz, p) in grid.samples() {
            assert_eq!(sdf.is_inside_sample(ix, iz), outline.contains(p));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn containment_matches_outline_away_from_boundary(
            x in -4.9f32..4.9,
            z in -4.9f32..4.9,
            seed in 0u64..64,
        ) {
            let outline = generate_outline(seed, &OutlineSpec::default()).unwrap();
            let sdf = SdfTexture::build(&outline, 33, 12.0).unwrap();
            let p = Vec2::new(x, z);
            // Corners of the interpolation cell lie within 1.5 spacings of `p`.
            prop_assume!(outline.distance_to_boundary(p) > 1.5 * sdf.grid().spacing());
            prop_assert_eq!(sdf.contains(p), outline.contains(p));
        }
    }
}
