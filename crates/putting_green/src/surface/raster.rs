//! Raster storage for scalar samples over a [`Grid`].
use glam::Vec2;

use super::grid::Grid;

/// A row-major grid of `f32` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub grid: Grid,
    pub data: Vec<f32>,
}

impl Raster {
    /// Creates a raster with every sample set to zero.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            data: vec![0.0; grid.len()],
        }
    }

    /// Creates a raster by evaluating `f` at every sample position.
    pub fn from_fn(grid: Grid, mut f: impl FnMut(usize, usize, Vec2) -> f32) -> Self {
        let data = grid.samples().map(|(ix, iz, p)| f(ix, iz, p)).collect();
        Self { grid, data }
    }

    /// Value at `(ix, iz)`, or `0.0` outside the lattice.
    pub fn get(&self, ix: isize, iz: isize) -> f32 {
        let n = self.grid.resolution as isize;
        if ix < 0 || iz < 0 || ix >= n || iz >= n {
            return 0.0;
        }
        self.data[self.grid.index(ix as usize, iz as usize)]
    }

    /// Value of the sample nearest to `p`, clamped to the lattice.
    pub fn sample_nearest(&self, p: Vec2) -> f32 {
        let l = self.grid.world_to_lattice(p).round();
        let max = (self.grid.resolution - 1) as f32;
        self.get(l.x.clamp(0.0, max) as isize, l.y.clamp(0.0, max) as isize)
    }

    /// Bilinear interpolation at `p`, clamped to the lattice.
    pub fn sample_bilinear(&self, p: Vec2) -> f32 {
        let (x0, z0, t) = self.cell_of(p);
        let a = self.get(x0, z0);
        let b = self.get(x0 + 1, z0);
        let c = self.get(x0, z0 + 1);
        let d = self.get(x0 + 1, z0 + 1);
        let top = a + (b - a) * t.x;
        let bottom = c + (d - c) * t.x;
        top + (bottom - top) * t.y
    }

    /// Lower-left sample of the cell containing `p` plus the fractional offset inside it.
    ///
    /// The returned cell always has valid upper neighbours.
    pub fn cell_of(&self, p: Vec2) -> (isize, isize, Vec2) {
        let max = (self.grid.resolution - 1) as f32;
        let l = self.grid.world_to_lattice(p).clamp(Vec2::ZERO, Vec2::splat(max));
        let x0 = l.x.floor().min(max - 1.0);
        let z0 = l.y.floor().min(max - 1.0);
        (x0 as isize, z0 as isize, Vec2::new(l.x - x0, l.y - z0))
    }

    /// Smallest and largest sample values.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Raster {
        let grid = Grid::new(3, 2.0).unwrap();
        Raster::from_fn(grid, |ix, _, _| ix as f32)
    }

    #[test]
    fn new_initializes_with_zeroes() {
        let raster = Raster::new(Grid::new(4, 1.0).unwrap());
        assert_eq!(raster.data.len(), 16);
        assert!(raster.data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn get_returns_zero_outside_bounds() {
        let raster = ramp();
        assert_eq!(raster.get(-1, 0), 0.0);
        assert_eq!(raster.get(3, 3), 0.0);
        assert_eq!(raster.get(2, 1), 2.0);
    }

    #[test]
    fn bilinear_interpolates_between_samples() {
        let raster = ramp();
        assert!((raster.sample_bilinear(Vec2::new(-0.5, 0.0)) - 0.5).abs() < 1e-6);
        assert!((raster.sample_bilinear(Vec2::new(1.0, 1.0)) - 2.0).abs() < 1e-6);
        // Outside the square clamps to the edge.
        assert!((raster.sample_bilinear(Vec2::new(9.0, 0.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn nearest_rounds_to_closest_sample() {
        let raster = ramp();
        assert_eq!(raster.sample_nearest(Vec2::new(-0.6, 0.3)), 0.0);
        assert_eq!(raster.sample_nearest(Vec2::new(-0.4, 0.3)), 1.0);
        assert_eq!(raster.min_max(), (0.0, 2.0));
    }
}
