//! Ball parameters, simulator tuning, and per-ball state.
use glam::{Quat, Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Error, Result};

/// Physical properties of a regulation golf ball.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallParams {
    /// Metres.
    pub radius: f32,
    /// Kilograms.
    pub mass: f32,
    /// Downward acceleration in m/s².
    pub gravity: f32,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            radius: 0.02135,
            mass: 0.04593,
            gravity: 9.81,
        }
    }
}

impl BallParams {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("ball.radius", self.radius)?;
        ensure_positive("ball.mass", self.mass)?;
        ensure_positive("ball.gravity", self.gravity)
    }
}

/// Integration and diagnostics settings shared by both physics models.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Largest timestep integrated in one call; longer frames are clamped.
    pub max_dt: f32,
    /// Speed below which a ball may stop, in m/s.
    pub stop_speed: f32,
    /// Quadratic drag coefficient, deceleration `quadratic_drag * |v|²`.
    pub quadratic_drag: f32,
    pub position_jump_warning: f32,
    pub velocity_delta_warning: f32,
    pub height_discontinuity_warning: f32,
    pub extreme_slope_percent: f32,
    /// Penetration ignored by the 3-D model's terrain contact.
    pub contact_tolerance: f32,
    /// Share of the penetration removed per step by graduated correction.
    pub correction_fraction: f32,
    /// Downward normal speed above which terrain contact uses a restitution impulse.
    pub bounce_threshold: f32,
    /// Normal speed under which contact counts as resting.
    pub resting_normal_speed: f32,
    pub terrain_restitution: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_dt: 1.0 / 30.0,
            stop_speed: 0.02,
            quadratic_drag: 0.02,
            position_jump_warning: 0.25,
            velocity_delta_warning: 1.5,
            height_discontinuity_warning: 0.03,
            extreme_slope_percent: 30.0,
            contact_tolerance: 0.001,
            correction_fraction: 0.5,
            bounce_threshold: 0.25,
            resting_normal_speed: 0.05,
            terrain_restitution: 0.25,
        }
    }
}

impl SimConfig {
    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt;
        self
    }

    pub fn with_stop_speed(mut self, stop_speed: f32) -> Self {
        self.stop_speed = stop_speed;
        self
    }

    pub fn with_quadratic_drag(mut self, quadratic_drag: f32) -> Self {
        self.quadratic_drag = quadratic_drag;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("sim.max_dt", self.max_dt)?;
        ensure_positive("sim.stop_speed", self.stop_speed)?;
        ensure_non_negative("sim.quadratic_drag", self.quadratic_drag)?;
        ensure_positive("sim.position_jump_warning", self.position_jump_warning)?;
        ensure_positive("sim.velocity_delta_warning", self.velocity_delta_warning)?;
        ensure_positive(
            "sim.height_discontinuity_warning",
            self.height_discontinuity_warning,
        )?;
        ensure_positive("sim.extreme_slope_percent", self.extreme_slope_percent)?;
        ensure_non_negative("sim.contact_tolerance", self.contact_tolerance)?;
        ensure_non_negative("sim.resting_normal_speed", self.resting_normal_speed)?;
        ensure_non_negative("sim.bounce_threshold", self.bounce_threshold)?;
        if !(self.correction_fraction > 0.0 && self.correction_fraction <= 1.0) {
            return Err(Error::InvalidConfig(
                "sim.correction_fraction must be in (0, 1]".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.terrain_restitution) {
            return Err(Error::InvalidConfig(
                "sim.terrain_restitution must be in [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BallPhase {
    AtRest,
    Moving,
    Stopped,
    Captured,
}

/// Mutable state of one ball. Owned by exactly one simulation loop.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BallState {
    /// Centre of the ball; `y` is up.
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Quat,
    pub angular_velocity: Vec3,
    pub in_contact: bool,
    pub phase: BallPhase,
    /// Set while the ball is inside the cup's capture radius and terrain collision is off.
    pub cup_override: bool,
    pub(crate) launch_reported: bool,
    pub(crate) stop_reported: bool,
}

impl BallState {
    /// A ball at `position` with initial `velocity`; moving if the velocity is non-zero.
    pub fn new(
        position: impl Into<mint::Vector3<f32>>,
        velocity: impl Into<mint::Vector3<f32>>,
    ) -> Self {
        let mut state = Self::at_rest(position);
        state.launch(velocity);
        state
    }

    pub fn at_rest(position: impl Into<mint::Vector3<f32>>) -> Self {
        Self {
            position: position.into().into(),
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            in_contact: true,
            phase: BallPhase::AtRest,
            cup_override: false,
            launch_reported: true,
            stop_reported: true,
        }
    }

    /// Applies a launch velocity. A captured ball stays captured.
    pub fn launch(&mut self, velocity: impl Into<mint::Vector3<f32>>) {
        if self.phase == BallPhase::Captured {
            return;
        }
        let velocity: Vec3 = velocity.into().into();
        if !velocity.is_finite() || velocity.length_squared() == 0.0 {
            return;
        }
        self.velocity = velocity;
        self.phase = BallPhase::Moving;
        self.launch_reported = false;
        self.stop_reported = false;
    }

    /// Moves the ball to `position` at rest, clearing spin and cup state.
    pub fn reset(&mut self, position: impl Into<mint::Vector3<f32>>) {
        *self = Self::at_rest(position);
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Position on the green plane (`x`, `z`).
    pub fn planar_position(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    pub fn planar_velocity(&self) -> Vec2 {
        Vec2::new(self.velocity.x, self.velocity.z)
    }

    pub fn is_moving(&self) -> bool {
        self.phase == BallPhase::Moving
    }

    /// Stopped or captured: no further step changes the ball.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, BallPhase::Stopped | BallPhase::Captured)
    }
}
