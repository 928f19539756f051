//! Cup geometry, capture detection, and rim lip-out deflection.
//!
//! The cup is a stateless collider: a vertical cylinder of [`CUP_DIAMETER`] and
//! [`CUP_DEPTH`] sunk into the terrain, with its rim plane tilted to the terrain normal
//! at the cup centre. The rim itself is an analytic torus of tube diameter
//! [`RIM_THICKNESS`] whose top is flush with the green.
use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ball::BallState;
use crate::error::{ensure_non_negative, ensure_positive, Error, Result};
use crate::surface::Heightfield;

/// Regulation cup diameter in metres (4.25 in).
pub const CUP_DIAMETER: f32 = 0.108;
/// Regulation minimum cup depth in metres (4 in).
pub const CUP_DEPTH: f32 = 0.1016;
pub const RIM_THICKNESS: f32 = 0.004;

/// Slack on the hole radius when deciding whether a ball centre is over the hole.
const EDGE_TOLERANCE: f32 = 1e-5;

/// Cup dimensions and capture tuning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CupConfig {
    pub diameter: f32,
    pub depth: f32,
    pub rim_thickness: f32,
    pub ball_radius: f32,
    /// Depth below the rim plane past which a ball is captured unconditionally.
    pub deep_capture_margin: f32,
    /// Speed above which the rim may deflect the ball.
    pub capture_speed: f32,
    /// Speed under which a ball at or below rim level counts as settled in the cup.
    pub settle_speed: f32,
    /// Downward-to-horizontal speed ratio above which a ball near the rim drops in.
    pub drop_ratio: f32,
    /// Speed retained after a rim deflection; below one.
    pub lip_restitution: f32,
    /// Collide with the rim torus while inside the capture radius.
    pub rim_collision: bool,
}

impl Default for CupConfig {
    fn default() -> Self {
        Self {
            diameter: CUP_DIAMETER,
            depth: CUP_DEPTH,
            rim_thickness: RIM_THICKNESS,
            ball_radius: 0.02135,
            deep_capture_margin: 0.03,
            capture_speed: 1.2,
            settle_speed: 0.05,
            drop_ratio: 1.0,
            lip_restitution: 0.6,
            rim_collision: true,
        }
    }
}

impl CupConfig {
    pub fn with_ball_radius(mut self, ball_radius: f32) -> Self {
        self.ball_radius = ball_radius;
        self
    }

    pub fn with_rim_collision(mut self, rim_collision: bool) -> Self {
        self.rim_collision = rim_collision;
        self
    }

    pub fn hole_radius(&self) -> f32 {
        self.diameter * 0.5
    }

    /// Horizontal distance from the cup axis inside which terrain collision is off.
    pub fn capture_radius(&self) -> f32 {
        self.hole_radius() + self.ball_radius * 0.5
    }

    /// Smallest centre distance from the cup axis at which the ball can touch the edge.
    pub fn rim_zone_inner(&self) -> f32 {
        self.hole_radius() - self.ball_radius
    }

    fn over_hole(&self, distance: f32) -> bool {
        distance <= self.hole_radius() + EDGE_TOLERANCE
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("cup.diameter", self.diameter)?;
        ensure_positive("cup.depth", self.depth)?;
        ensure_non_negative("cup.rim_thickness", self.rim_thickness)?;
        ensure_positive("cup.ball_radius", self.ball_radius)?;
        ensure_positive("cup.deep_capture_margin", self.deep_capture_margin)?;
        ensure_positive("cup.capture_speed", self.capture_speed)?;
        ensure_non_negative("cup.settle_speed", self.settle_speed)?;
        ensure_positive("cup.drop_ratio", self.drop_ratio)?;
        if self.ball_radius >= self.hole_radius() {
            return Err(Error::InvalidConfig(
                "ball must be smaller than the hole".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.lip_restitution) {
            return Err(Error::InvalidConfig(
                "cup.lip_restitution must be in [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

/// A cup sunk into the green.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Cup {
    /// Centre of the rim circle.
    pub center: Vec3,
    /// Unit normal of the rim plane, pointing up.
    pub normal: Vec3,
    pub config: CupConfig,
}

impl Cup {
    /// A cup with its rim centre at `center` and rim plane normal `normal`. A degenerate
    /// normal falls back to world up.
    pub fn new(center: impl Into<mint::Vector3<f32>>, normal: Vec3, config: CupConfig) -> Self {
        let normal = match normal.try_normalize() {
            Some(n) if n.y > 0.0 => n,
            Some(n) if n.y < 0.0 => -n,
            _ => Vec3::Y,
        };
        Self {
            center: center.into().into(),
            normal,
            config,
        }
    }

    /// Places a cup at `planar` on the terrain, tilted to the local surface normal.
    pub fn place(field: &Heightfield, planar: Vec2, config: CupConfig) -> Self {
        let height = field.height_at(planar);
        Self::new(
            Vec3::new(planar.x, height, planar.y),
            field.normal_at(planar),
            config,
        )
    }

    pub fn planar_center(&self) -> Vec2 {
        Vec2::new(self.center.x, self.center.z)
    }

    /// Signed distance of `ball_position` above the rim plane.
    pub fn height_above_rim(&self, ball_position: Vec3) -> f32 {
        (ball_position - self.center).dot(self.normal)
    }

    /// Component of `ball_position - center` lying in the rim plane.
    pub fn horizontal_offset(&self, ball_position: Vec3) -> Vec3 {
        let d = ball_position - self.center;
        d - self.normal * d.dot(self.normal)
    }

    pub fn horizontal_distance(&self, ball_position: Vec3) -> f32 {
        self.horizontal_offset(ball_position).length()
    }

    /// Returns `true` while terrain collision should be off for a ball at `ball_position`.
    pub fn overrides_terrain(&self, ball_position: Vec3) -> bool {
        self.horizontal_distance(ball_position) < self.config.capture_radius()
    }

    /// Where a ball that was over the hole at `previous` meets the hole edge on its way
    /// to `current`: the ball is pulled back along its radial line until it just touches
    /// the edge, or the wall when below the rim plane. `None` when the ball came from
    /// outside the hole or stays clear of the edge.
    pub fn edge_contact(&self, previous: Vec3, current: Vec3) -> Option<Vec3> {
        let c = &self.config;
        let r = c.ball_radius;
        if !c.over_hole(self.horizontal_distance(previous)) {
            return None;
        }
        let height = self.height_above_rim(current);
        if height >= r {
            return None;
        }
        let offset = self.horizontal_offset(current);
        let distance = offset.length();
        let h = height.max(0.0);
        let reach = c.hole_radius() - (r * r - h * h).sqrt();
        if distance <= reach {
            return None;
        }
        let radial = offset.try_normalize()?;
        Some(current - radial * (distance - reach))
    }

    /// Unit normal of the edge (or wall) pushing on a ball at `ball_position`, pointing
    /// from the contact towards the ball centre.
    pub fn edge_normal(&self, ball_position: Vec3) -> Option<Vec3> {
        let radial = self.horizontal_offset(ball_position).try_normalize()?;
        if self.height_above_rim(ball_position) < 0.0 {
            return Some(-radial);
        }
        let edge = self.center + radial * self.config.hole_radius();
        (ball_position - edge).try_normalize()
    }

    /// Collision for a ball under cup override that moved from `previous` to its current
    /// position. Outside the hole the ball rests on the green at rim level; over the hole
    /// it is kept off the side wall and the bottom, and off the rim torus when enabled.
    /// Contacts are inelastic; lip-out bounce is [`deflect`]'s job. Returns `true` if any
    /// surface was touched.
    pub fn resolve_interior(&self, state: &mut BallState, previous: Vec3) -> bool {
        let c = &self.config;
        let r = c.ball_radius;
        let mut touched = false;

        let came_over_hole = c.over_hole(self.horizontal_distance(previous));
        let height = self.height_above_rim(state.position);
        let over_hole = c.over_hole(self.horizontal_distance(state.position));
        if !came_over_hole && !over_hole && height < r {
            state.position += self.normal * (r - height);
            let vn = state.velocity.dot(self.normal);
            if vn < 0.0 {
                state.velocity -= self.normal * vn;
            }
            touched = true;
        }

        if c.rim_collision && self.resolve_rim(state) {
            touched = true;
        }

        let height = self.height_above_rim(state.position);
        let offset = self.horizontal_offset(state.position);
        let distance = offset.length();
        let wall = c.rim_zone_inner();
        if (came_over_hole || over_hole) && height < 0.0 && distance > wall {
            if let Some(radial) = offset.try_normalize() {
                state.position -= radial * (distance - wall);
                let vn = state.velocity.dot(radial);
                if vn > 0.0 {
                    state.velocity -= radial * vn;
                }
                touched = true;
            }
        }

        let floor = r - c.depth;
        let height = self.height_above_rim(state.position);
        if height < floor {
            state.position += self.normal * (floor - height);
            let vn = state.velocity.dot(self.normal);
            if vn < 0.0 {
                state.velocity -= self.normal * vn;
            }
            touched = true;
        }
        touched
    }

    fn resolve_rim(&self, state: &mut BallState) -> bool {
        let c = &self.config;
        let Some(radial) = self.horizontal_offset(state.position).try_normalize() else {
            return false;
        };
        let tube = c.rim_thickness * 0.5;
        let nearest = self.center + radial * c.hole_radius() - self.normal * tube;
        let to_ball = state.position - nearest;
        let distance = to_ball.length();
        let reach = c.ball_radius + tube;
        if distance >= reach {
            return false;
        }
        let Some(n) = to_ball.try_normalize() else {
            return false;
        };
        state.position = nearest + n * reach;
        let vn = state.velocity.dot(n);
        if vn < 0.0 {
            state.velocity -= n * vn;
        }
        true
    }
}

/// Returns `true` if a ball at `ball_position` moving with `ball_velocity` is in the cup.
///
/// The ball centre must be over the hole. Then any one of these suffices: the centre is
/// more than `deep_capture_margin` below the rim plane; the ball has settled at or below
/// rim level; or the ball is near the rim and dropping faster than it moves sideways by
/// `drop_ratio`.
pub fn check_capture(ball_position: Vec3, ball_velocity: Vec3, cup: &Cup) -> bool {
    if !ball_position.is_finite() || !ball_velocity.is_finite() {
        return false;
    }
    let c = &cup.config;
    if cup.horizontal_distance(ball_position) >= c.hole_radius() {
        return false;
    }
    let height = cup.height_above_rim(ball_position);
    if height < -c.deep_capture_margin {
        return true;
    }
    if ball_velocity.length() < c.settle_speed && height <= 0.0 {
        return true;
    }
    let normal_speed = ball_velocity.dot(cup.normal);
    let lateral = (ball_velocity - cup.normal * normal_speed).length();
    let downward = -normal_speed;
    height <= c.ball_radius && downward > 0.0 && downward > c.drop_ratio * lateral
}

/// Lip-out response for a ball centred over the hole, touching the far edge and moving
/// outward faster than `capture_speed`: the velocity reflected about the radial rim
/// normal and scaled by `lip_restitution`. `None` when the rim does not interact, which
/// includes every ball whose centre is outside the hole.
pub fn deflect(ball_position: Vec3, ball_velocity: Vec3, cup: &Cup) -> Option<Vec3> {
    if !ball_position.is_finite() || !ball_velocity.is_finite() {
        return None;
    }
    let c = &cup.config;
    let offset = cup.horizontal_offset(ball_position);
    let distance = offset.length();
    if distance < c.rim_zone_inner() - EDGE_TOLERANCE || !c.over_hole(distance) {
        return None;
    }
    if ball_velocity.length() <= c.capture_speed {
        return None;
    }
    let height = cup.height_above_rim(ball_position);
    if height < -c.ball_radius || height >= c.ball_radius {
        return None;
    }
    let n = offset.try_normalize()?;
    let edge = cup.center + n * c.hole_radius();
    if height >= 0.0 && ball_position.distance(edge) > c.ball_radius + EDGE_TOLERANCE {
        return None;
    }
    let vn = ball_velocity.dot(n);
    if vn <= 0.0 {
        return None;
    }
    Some((ball_velocity - 2.0 * vn * n) * c.lip_restitution)
}
