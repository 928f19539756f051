//! Heightfield synthesis and terrain queries.
//!
//! Samples outside the SDF boundary hold the sentinel height `0.0` and are excluded from
//! every height, gradient, and slope computation: interpolation renormalises over inside
//! corners and finite differences fall back to one-sided stencils at the edge.
use glam::{Vec2, Vec3};
use tracing::{debug, warn};

use super::features::{base_plane, feature_sum, FeatureContext};
use super::grid::Grid;
use super::raster::Raster;
use super::sdf::SdfTexture;
use super::seed::mix_u64;
use super::spec::GreenSurfaceSpec;
use super::turf::TurfNoise;
use crate::error::{Error, Result};

const WEIGHT_EPSILON: f32 = 1e-6;

/// Square grid of terrain heights masked by the green outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    raster: Raster,
    inside: Vec<bool>,
}

impl Heightfield {
    /// Sums the base plane, turf noise, and enabled features over every inside sample.
    ///
    /// Heights are shifted so the lowest inside sample sits at zero, then the relief is
    /// scaled down uniformly if its steepest slope would exceed the surface's cap.
    pub fn synthesize(
        sdf: &SdfTexture,
        spec: &GreenSurfaceSpec,
        ctx: &FeatureContext,
    ) -> Result<Self> {
        spec.validate()?;
        let turf = TurfNoise::new(ctx.seed, spec.noise_amplitude, spec.noise_frequency);
        let grid = sdf.grid();
        let inside: Vec<bool> = sdf.raster().data.iter().map(|d| *d < 0.0).collect();
        if !inside.iter().any(|i| *i) {
            return Err(Error::DegenerateOutline(format!(
                "outline covers no samples at resolution {}",
                grid.resolution
            )));
        }

        let mut raster = Raster::from_fn(grid, |ix, iz, p| {
            if inside[grid.index(ix, iz)] {
                base_plane(p, ctx, spec) + turf.sample(p) + feature_sum(p, ctx, spec)
            } else {
                0.0
            }
        });

        if let Some(bad) = raster.data.iter().position(|h| !h.is_finite()) {
            return Err(Error::InvalidSurface(format!(
                "surface produced a non-finite height at sample {bad}"
            )));
        }

        let min = raster
            .data
            .iter()
            .zip(&inside)
            .filter(|(_, i)| **i)
            .map(|(h, _)| *h)
            .fold(f32::INFINITY, f32::min);
        for (h, i) in raster.data.iter_mut().zip(&inside) {
            if *i {
                *h -= min;
            }
        }

        let mut field = Self { raster, inside };
        let max_slope = field.max_slope_percent();
        if max_slope > spec.max_slope_percent {
            let scale = spec.max_slope_percent / max_slope * (1.0 - 1e-4);
            warn!(
                "Surface slope {:.2}% exceeds cap {:.2}%; scaling relief by {:.4}.",
                max_slope, spec.max_slope_percent, scale
            );
            for h in field.raster.data.iter_mut() {
                *h *= scale;
            }
        }

        if field.raster.data.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return Err(Error::InvalidSurface(
                "surface produced negative or non-finite heights".into(),
            ));
        }
        debug!(
            "Synthesized {}x{} heightfield, max slope {:.2}%.",
            grid.resolution,
            grid.resolution,
            field.max_slope_percent()
        );
        Ok(field)
    }

    /// Builds a heightfield by evaluating `f` at inside samples of `sdf`.
    ///
    /// Useful for hosts that author terrain directly and for analytic test surfaces. The
    /// result is rejected if any inside height is negative or non-finite.
    pub fn from_fn(sdf: &SdfTexture, mut f: impl FnMut(Vec2) -> f32) -> Result<Self> {
        let grid = sdf.grid();
        let inside: Vec<bool> = sdf.raster().data.iter().map(|d| *d < 0.0).collect();
        let raster = Raster::from_fn(grid, |ix, iz, p| {
            if inside[grid.index(ix, iz)] {
                f(p)
            } else {
                0.0
            }
        });
        if raster.data.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return Err(Error::InvalidSurface(
                "heights must be finite and >= 0".into(),
            ));
        }
        Ok(Self { raster, inside })
    }

    /// A flat heightfield at zero elevation masked by `sdf`.
    pub fn flat(sdf: &SdfTexture) -> Self {
        let inside = sdf.raster().data.iter().map(|d| *d < 0.0).collect();
        Self {
            raster: Raster::new(sdf.grid()),
            inside,
        }
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

    pub fn is_inside_sample(&self, ix: usize, iz: usize) -> bool {
        self.inside[self.raster.grid.index(ix, iz)]
    }

    pub fn height_sample(&self, ix: usize, iz: usize) -> f32 {
        self.raster.data[self.raster.grid.index(ix, iz)]
    }

    /// Returns `true` if the sample nearest to `p` lies on the green.
    pub fn is_on_green(&self, p: Vec2) -> bool {
        if !self.raster.grid.contains(p) {
            return false;
        }
        let l = self.raster.grid.world_to_lattice(p).round();
        self.is_inside_sample(l.x as usize, l.y as usize)
    }

    /// Terrain height at `p`, or `None` when no corner of the enclosing cell is on the green.
    pub fn try_height_at(&self, p: Vec2) -> Option<f32> {
        if !self.raster.grid.contains(p) {
            return None;
        }
        let (x0, z0, t) = self.raster.cell_of(p);
        let corners = [
            (x0, z0, (1.0 - t.x) * (1.0 - t.y)),
            (x0 + 1, z0, t.x * (1.0 - t.y)),
            (x0, z0 + 1, (1.0 - t.x) * t.y),
            (x0 + 1, z0 + 1, t.x * t.y),
        ];
        let mut sum = 0.0;
        let mut weight = 0.0;
        let mut plain_sum = 0.0;
        let mut count = 0;
        for (ix, iz, w) in corners {
            if self.is_inside_sample(ix as usize, iz as usize) {
                let h = self.raster.get(ix, iz);
                sum += h * w;
                weight += w;
                plain_sum += h;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else if weight > WEIGHT_EPSILON {
            Some(sum / weight)
        } else {
            Some(plain_sum / count as f32)
        }
    }

    /// Terrain height at `p`; the sentinel `0.0` off the green.
    pub fn height_at(&self, p: Vec2) -> f32 {
        self.try_height_at(p).unwrap_or(0.0)
    }

    /// Height gradient `(∂h/∂x, ∂h/∂z)` at `p` by central differences over one lattice
    /// spacing. Off-green neighbours are skipped; with no usable pair the gradient is zero.
    pub fn gradient_at(&self, p: Vec2) -> Vec2 {
        let e = self.raster.grid.spacing();
        let center = self.try_height_at(p);
        let axis = |offset: Vec2| -> f32 {
            let fwd = self.try_height_at(p + offset);
            let back = self.try_height_at(p - offset);
            difference(fwd, center, back, e)
        };
        Vec2::new(axis(Vec2::new(e, 0.0)), axis(Vec2::new(0.0, e)))
    }

    /// Upward unit surface normal at `p`.
    pub fn normal_at(&self, p: Vec2) -> Vec3 {
        let g = self.gradient_at(p);
        Vec3::new(-g.x, 1.0, -g.y).normalize()
    }

    /// Slope magnitude at `p` in percent.
    pub fn slope_percent_at(&self, p: Vec2) -> f32 {
        self.gradient_at(p).length() * 100.0
    }

    /// Lattice gradient at an inside sample using only inside neighbours.
    pub fn sample_gradient(&self, ix: usize, iz: usize) -> Vec2 {
        let n = self.resolution();
        let e = self.raster.grid.spacing();
        let at = |x: isize, z: isize| -> Option<f32> {
            if x < 0 || z < 0 || x >= n as isize || z >= n as isize {
                return None;
            }
            self.is_inside_sample(x as usize, z as usize)
                .then(|| self.raster.get(x, z))
        };
        let (x, z) = (ix as isize, iz as isize);
        let center = at(x, z);
        Vec2::new(
            difference(at(x + 1, z), center, at(x - 1, z), e),
            difference(at(x, z + 1), center, at(x, z - 1), e),
        )
    }

    /// Steepest lattice slope over all inside samples, in percent.
    pub fn max_slope_percent(&self) -> f32 {
        let n = self.resolution();
        let mut max: f32 = 0.0;
        for iz in 0..n {
            for ix in 0..n {
                if self.is_inside_sample(ix, iz) {
                    max = max.max(self.sample_gradient(ix, iz).length() * 100.0);
                }
            }
        }
        max
    }

    /// Order-sensitive hash of every height's bit pattern.
    pub fn fingerprint(&self) -> u64 {
        self.raster
            .data
            .iter()
            .fold(0x2545F4914F6CDD1D, |acc, h| {
                mix_u64(acc ^ u64::from(h.to_bits()))
            })
    }
}

/// Central difference when both neighbours exist, one-sided against the centre otherwise.
fn difference(fwd: Option<f32>, center: Option<f32>, back: Option<f32>, e: f32) -> f32 {
    match (fwd, center, back) {
        (Some(f), _, Some(b)) => (f - b) / (2.0 * e),
        (Some(f), Some(c), None) => (f - c) / e,
        (None, Some(c), Some(b)) => (c - b) / e,
        _ => 0.0,
    }
}
