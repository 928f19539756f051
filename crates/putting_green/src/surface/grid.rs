//! Square sample lattice shared by the signed-distance field and the heightfield.
//!
//! [`Grid`] places `resolution × resolution` samples over a square of side `world_size`
//! centred on the origin. Sample `(ix, iz)` sits at
//! `(-world_size / 2 + ix * spacing, -world_size / 2 + iz * spacing)`.
use glam::Vec2;

use crate::error::{ensure_positive, Error, Result};

/// Square sampling lattice in the x/z plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    /// Samples per side.
    pub resolution: usize,
    /// Side length of the covered square in world units.
    pub world_size: f32,
}

impl Grid {
    /// Creates a grid, rejecting resolutions that cannot form a lattice.
    pub fn new(resolution: usize, world_size: f32) -> Result<Self> {
        if resolution <= 1 {
            return Err(Error::InvalidResolution { resolution });
        }
        ensure_positive("world_size", world_size)?;
        Ok(Self {
            resolution,
            world_size,
        })
    }

    /// Distance between neighbouring samples.
    #[inline]
    pub fn spacing(&self) -> f32 {
        self.world_size / (self.resolution - 1) as f32
    }

    /// Total sample count.
    #[inline]
    pub fn len(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Always `false`; a valid grid has at least four samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World-space minimum corner.
    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::splat(-self.world_size * 0.5)
    }

    /// Row-major index of sample `(ix, iz)`.
    #[inline]
    pub fn index(&self, ix: usize, iz: usize) -> usize {
        iz * self.resolution + ix
    }

    /// World position of sample `(ix, iz)`.
    #[inline]
    pub fn index_to_world(&self, ix: usize, iz: usize) -> Vec2 {
        self.origin() + Vec2::new(ix as f32, iz as f32) * self.spacing()
    }

    /// Fractional lattice coordinates of a world position (not clamped).
    #[inline]
    pub fn world_to_lattice(&self, p: Vec2) -> Vec2 {
        (p - self.origin()) / self.spacing()
    }

    /// Returns `true` if `p` lies inside the covered square.
    pub fn contains(&self, p: Vec2) -> bool {
        let half = self.world_size * 0.5;
        p.x >= -half && p.x <= half && p.y >= -half && p.y <= half
    }

    /// Iterates all `(ix, iz, world_position)` triples in row-major order.
    pub fn samples(&self) -> impl Iterator<Item = (usize, usize, Vec2)> + '_ {
        (0..self.resolution).flat_map(move |iz| {
            (0..self.resolution).map(move |ix| (ix, iz, self.index_to_world(ix, iz)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_resolution_one() {
        assert!(matches!(
            Grid::new(1, 10.0),
            Err(Error::InvalidResolution { resolution: 1 })
        ));
        assert!(Grid::new(0, 10.0).is_err());
        assert!(Grid::new(4, 0.0).is_err());
    }

    #[test]
    fn lattice_spans_world_square() {
        let grid = Grid::new(11, 10.0).unwrap();
        assert_eq!(grid.spacing(), 1.0);
        assert_eq!(grid.index_to_world(0, 0), Vec2::new(-5.0, -5.0));
        assert_eq!(grid.index_to_world(10, 10), Vec2::new(5.0, 5.0));
        assert_eq!(grid.index(3, 2), 25);
    }

    #[test]
    fn world_lattice_roundtrip() {
        let grid = Grid::new(5, 8.0).unwrap();
        let p = grid.index_to_world(3, 1);
        assert_eq!(grid.world_to_lattice(p), Vec2::new(3.0, 1.0));
        assert_eq!(grid.samples().count(), 25);
    }
}
