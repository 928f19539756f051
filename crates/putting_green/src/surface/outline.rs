//! Closed boundary curves for greens.
//!
//! An outline is generated from a shape family's radial profile with seeded low-frequency
//! jitter, or supplied directly by a host through [`GreenOutline::from_points`]. Either way
//! it is validated once (point count, area, simplicity) and immutable afterwards.
use std::f32::consts::{PI, TAU};

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::seed::{signed_unit, unit, Stream};
use crate::error::{ensure_positive, Error, Result};

/// Smallest enclosed area accepted for any outline, in square world units.
pub const MIN_OUTLINE_AREA: f32 = 1.0;

/// Minimum number of polyline vertices.
pub const MIN_OUTLINE_POINTS: usize = 8;

const JITTER_HARMONICS: std::ops::RangeInclusive<u64> = 2..=5;

/// Shape family of a generated outline.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutlineShape {
    /// Circle with the mean of both half-extents as radius.
    Round,
    /// Ellipse with the given half-extents.
    #[default]
    Oval,
    /// Ellipse with a smooth inward dent on the +z side.
    Kidney,
    /// Ellipse pinched across its minor axis.
    Peanut,
}

impl OutlineShape {
    /// Unjittered radius at angle `theta` for half-extents `half`.
    pub fn radius(self, theta: f32, half: Vec2) -> f32 {
        match self {
            OutlineShape::Round => (half.x + half.y) * 0.5,
            OutlineShape::Oval => ellipse_radius(theta, half),
            OutlineShape::Kidney => {
                let d = angle_between(theta, PI * 0.5);
                ellipse_radius(theta, half) * (1.0 - 0.22 * (-(d / 0.55).powi(2)).exp())
            }
            OutlineShape::Peanut => ellipse_radius(theta, half) * (0.8 + 0.2 * (2.0 * theta).cos()),
        }
    }
}

/// Parameters for [`generate_outline`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineSpec {
    pub shape: OutlineShape,
    /// Half-extents along x and z before rotation.
    pub half_extent: Vec2,
    pub point_count: usize,
    /// Relative radial jitter in `[0, 0.5)`.
    pub jitter: f32,
    pub rotation_degrees: f32,
}

impl Default for OutlineSpec {
    fn default() -> Self {
        Self {
            shape: OutlineShape::Oval,
            half_extent: Vec2::new(4.5, 3.5),
            point_count: 96,
            jitter: 0.08,
            rotation_degrees: 0.0,
        }
    }
}

impl OutlineSpec {
    pub fn new(shape: OutlineShape, half_extent: Vec2) -> Self {
        Self {
            shape,
            half_extent,
            ..Default::default()
        }
    }

    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_rotation_degrees(mut self, rotation_degrees: f32) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    /// Largest radius the jittered outline can reach from its centre.
    pub fn max_extent(&self) -> f32 {
        self.half_extent.max_element() * (1.0 + self.jitter.max(0.0))
    }

    pub fn validate(&self) -> Result<()> {
        if self.point_count < MIN_OUTLINE_POINTS {
            return Err(Error::DegenerateOutline(format!(
                "point_count must be >= {MIN_OUTLINE_POINTS} (got {})",
                self.point_count
            )));
        }
        ensure_positive("half_extent.x", self.half_extent.x)?;
        ensure_positive("half_extent.y", self.half_extent.y)?;
        if !self.jitter.is_finite() || !(0.0..0.5).contains(&self.jitter) {
            return Err(Error::InvalidConfig(format!(
                "jitter must be in [0, 0.5) (got {})",
                self.jitter
            )));
        }
        if !self.rotation_degrees.is_finite() {
            return Err(Error::InvalidConfig("rotation_degrees must be finite".into()));
        }
        Ok(())
    }
}

/// A closed polyline bounding the green. The closing edge from the last point back to the
/// first is implicit.
#[derive(Clone, Debug, PartialEq)]
pub struct GreenOutline {
    points: Vec<Vec2>,
    area: f32,
    shape: Option<OutlineShape>,
}

impl GreenOutline {
    /// Builds an outline from host-supplied points, rejecting degenerate polygons.
    pub fn from_points(points: Vec<Vec2>) -> Result<Self> {
        Self::checked(points, None, MIN_OUTLINE_AREA)
    }

    fn checked(points: Vec<Vec2>, shape: Option<OutlineShape>, min_area: f32) -> Result<Self> {
        if points.len() < MIN_OUTLINE_POINTS {
            return Err(Error::DegenerateOutline(format!(
                "outline needs at least {MIN_OUTLINE_POINTS} points (got {})",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::DegenerateOutline("outline contains non-finite points".into()));
        }
        let area = polygon_area(&points).abs();
        if area < min_area {
            return Err(Error::DegenerateOutline(format!(
                "enclosed area {area:.4} is below the minimum {min_area:.4}"
            )));
        }
        if let Some((i, j)) = first_self_intersection(&points) {
            return Err(Error::DegenerateOutline(format!(
                "edges {i} and {j} intersect"
            )));
        }
        Ok(Self {
            points,
            area,
            shape,
        })
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Enclosed area in square world units.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Shape family, if the outline was generated rather than supplied.
    pub fn shape(&self) -> Option<OutlineShape> {
        self.shape
    }

    /// Iterates the closed polyline's edges as `(start, end)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Even-odd point-in-polygon test.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let t = (p.y - a.y) / (b.y - a.y);
                if p.x < a.x + t * (b.x - a.x) {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Unsigned distance from `p` to the nearest edge.
    pub fn distance_to_boundary(&self, p: Vec2) -> f32 {
        self.edges()
            .map(|(a, b)| point_segment_distance(p, a, b))
            .fold(f32::INFINITY, f32::min)
    }

    /// Distance to the boundary, negative inside.
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        let d = self.distance_to_boundary(p);
        if self.contains(p) {
            -d
        } else {
            d
        }
    }

    /// Area-weighted centroid.
    pub fn centroid(&self) -> Vec2 {
        let mut c = Vec2::ZERO;
        let mut twice_area = 0.0;
        for (a, b) in self.edges() {
            let cross = a.perp_dot(b);
            twice_area += cross;
            c += (a + b) * cross;
        }
        if twice_area.abs() <= f32::EPSILON {
            return self.points.iter().copied().sum::<Vec2>() / self.points.len() as f32;
        }
        c / (3.0 * twice_area)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        self.points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }

    /// Largest distance from the centroid to any vertex.
    pub fn max_radius(&self) -> f32 {
        let c = self.centroid();
        self.points
            .iter()
            .map(|p| p.distance(c))
            .fold(0.0, f32::max)
    }

    /// The two vertices farthest apart.
    pub fn longest_chord(&self) -> (Vec2, Vec2) {
        let mut best = (self.points[0], self.points[0]);
        let mut best_d2 = -1.0;
        for (i, a) in self.points.iter().enumerate() {
            for b in &self.points[i + 1..] {
                let d2 = a.distance_squared(*b);
                if d2 > best_d2 {
                    best_d2 = d2;
                    best = (*a, *b);
                }
            }
        }
        best
    }
}

/// Generates a closed outline for `spec`, deterministic in `seed`.
pub fn generate_outline(seed: u64, spec: &OutlineSpec) -> Result<GreenOutline> {
    spec.validate()?;

    let harmonics: Vec<(f32, f32, f32)> = JITTER_HARMONICS
        .map(|k| {
            let amp = unit(seed, Stream::Outline, k, 0) / k as f32;
            let phase = signed_unit(seed, Stream::Outline, k, 1) * PI;
            (k as f32, amp, phase)
        })
        .collect();
    let norm: f32 = JITTER_HARMONICS.map(|k| 1.0 / k as f32).sum();

    let rotation = Vec2::from_angle(spec.rotation_degrees.to_radians());
    let points = (0..spec.point_count)
        .map(|i| {
            let theta = TAU * i as f32 / spec.point_count as f32;
            let wobble: f32 = harmonics
                .iter()
                .map(|(k, amp, phase)| amp * (k * theta + phase).sin())
                .sum::<f32>()
                / norm;
            let r = spec.shape.radius(theta, spec.half_extent) * (1.0 + spec.jitter * wobble);
            rotation.rotate(Vec2::from_angle(theta) * r)
        })
        .collect();

    let reference_area = PI * spec.half_extent.x * spec.half_extent.y;
    let min_area = (reference_area * 0.05).max(MIN_OUTLINE_AREA);
    GreenOutline::checked(points, Some(spec.shape), min_area)
}

/// Shoelace area, positive for counter-clockwise winding.
pub fn polygon_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Distance from `p` to the segment `ab`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn first_self_intersection(points: &[Vec2]) -> Option<(usize, usize)> {
    let n = points.len();
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        for j in (i + 2)..n {
            // The last edge shares a vertex with the first.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (points[j], points[(j + 1) % n]);
            if segments_intersect(a, b, c, d) {
                return Some((i, j));
            }
        }
    }
    None
}

fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let o1 = (b - a).perp_dot(c - a);
    let o2 = (b - a).perp_dot(d - a);
    let o3 = (d - c).perp_dot(a - c);
    let o4 = (d - c).perp_dot(b - c);
    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }
    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn ellipse_radius(theta: f32, half: Vec2) -> f32 {
    let (s, c) = theta.sin_cos();
    let denom = ((half.y * c).powi(2) + (half.x * s).powi(2)).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    half.x * half.y / denom
}

fn angle_between(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Vec2> {
        // Eight points so the minimum point count is met.
        let h = size * 0.5;
        vec![
            Vec2::new(-h, -h),
            Vec2::new(0.0, -h),
            Vec2::new(h, -h),
            Vec2::new(h, 0.0),
            Vec2::new(h, h),
            Vec2::new(0.0, h),
            Vec2::new(-h, h),
            Vec2::new(-h, 0.0),
        ]
    }

    #[test]
    fn oval_area_matches_ellipse() {
        let spec = OutlineSpec::new(OutlineShape::Oval, Vec2::new(4.0, 3.0))
            .with_jitter(0.0)
            .with_point_count(256);
        let outline = generate_outline(1, &spec).unwrap();
        let expected = PI * 12.0;
        assert!((outline.area() - expected).abs() / expected < 0.01);
        assert!(outline.centroid().length() < 1e-3);
        assert_eq!(outline.shape(), Some(OutlineShape::Oval));
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let spec = OutlineSpec::default();
        let a = generate_outline(9, &spec).unwrap();
        let b = generate_outline(9, &spec).unwrap();
        let c = generate_outline(10, &spec).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.points(), c.points());
    }

    #[test]
    fn every_shape_family_generates() {
        for shape in [
            OutlineShape::Round,
            OutlineShape::Oval,
            OutlineShape::Kidney,
            OutlineShape::Peanut,
        ] {
            let spec = OutlineSpec::new(shape, Vec2::new(5.0, 3.5)).with_rotation_degrees(30.0);
            let outline = generate_outline(3, &spec).unwrap();
            assert!(outline.area() > MIN_OUTLINE_AREA);
            assert!(outline.contains(outline.centroid()));
        }
    }

    #[test]
    fn rejects_invalid_specs() {
        let few = OutlineSpec::default().with_point_count(4);
        assert!(matches!(
            generate_outline(0, &few),
            Err(Error::DegenerateOutline(_))
        ));
        let flat = OutlineSpec::new(OutlineShape::Oval, Vec2::new(4.0, 0.0));
        assert!(generate_outline(0, &flat).is_err());
        let wild = OutlineSpec::default().with_jitter(0.7);
        assert!(generate_outline(0, &wild).is_err());
    }

    #[test]
    fn rejects_tiny_area() {
        let spec = OutlineSpec::new(OutlineShape::Round, Vec2::new(0.2, 0.2)).with_jitter(0.0);
        assert!(matches!(
            generate_outline(0, &spec),
            Err(Error::DegenerateOutline(_))
        ));
    }

    #[test]
    fn rejects_self_intersecting_points() {
        let mut pts = square(4.0);
        pts.swap(1, 5);
        assert!(matches!(
            GreenOutline::from_points(pts),
            Err(Error::DegenerateOutline(_))
        ));
    }

    #[test]
    fn contains_and_signed_distance_agree() {
        let outline = GreenOutline::from_points(square(4.0)).unwrap();
        assert!(outline.contains(Vec2::ZERO));
        assert!(!outline.contains(Vec2::new(3.0, 0.0)));
        assert!((outline.signed_distance(Vec2::ZERO) + 2.0).abs() < 1e-6);
        assert!((outline.signed_distance(Vec2::new(3.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!((outline.area() - 16.0).abs() < 1e-4);
    }

    #[test]
    fn longest_chord_spans_oval_major_axis() {
        let spec = OutlineSpec::new(OutlineShape::Oval, Vec2::new(5.0, 2.0))
            .with_jitter(0.0)
            .with_point_count(64);
        let outline = generate_outline(0, &spec).unwrap();
        let (a, b) = outline.longest_chord();
        assert!((a.distance(b) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn segment_distance_handles_degenerate_segment() {
        let d = point_segment_distance(Vec2::new(1.0, 0.0), Vec2::ZERO, Vec2::ZERO);
        assert_eq!(d, 1.0);
    }
}
