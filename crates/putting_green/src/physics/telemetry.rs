//! Per-step telemetry and advisory stability warnings.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ball::{BallPhase, BallState, SimConfig};

/// Forces acting on the ball during one step, in newtons.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceBreakdown {
    pub gravity: Vec3,
    pub friction: Vec3,
    pub drag: Vec3,
    pub normal: Vec3,
}

impl ForceBreakdown {
    pub fn total(&self) -> Vec3 {
        self.gravity + self.friction + self.drag + self.normal
    }
}

/// Advisory signal about a step. The simulation always continues.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum SimWarning {
    LargePositionJump { distance: f32 },
    LargeVelocityDelta { delta: f32 },
    HeightDiscontinuity { delta: f32 },
    ExtremeSlope { percent: f32 },
    TimestepClamped { requested: f32, used: f32 },
    /// The ball is over a part of the world that is not green.
    OffGreen,
}

/// Snapshot of one simulator step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StepTelemetry {
    /// Timestep actually integrated, after clamping.
    pub dt: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub forces: ForceBreakdown,
    pub slope_percent: f32,
    pub rotation_axis: Vec3,
    pub angular_speed: f32,
    pub in_contact: bool,
    pub cup_override: bool,
    pub phase: BallPhase,
    pub warnings: Vec<SimWarning>,
}

impl StepTelemetry {
    /// Telemetry for a step that left `state` untouched.
    pub fn idle(state: &BallState) -> Self {
        let angular_speed = state.angular_velocity.length();
        Self {
            dt: 0.0,
            position: state.position,
            velocity: state.velocity,
            speed: state.speed(),
            forces: ForceBreakdown::default(),
            slope_percent: 0.0,
            rotation_axis: state.angular_velocity.normalize_or_zero(),
            angular_speed,
            in_contact: state.in_contact,
            cup_override: state.cup_override,
            phase: state.phase,
            warnings: Vec::new(),
        }
    }

    pub fn has_warning(&self, pred: impl Fn(&SimWarning) -> bool) -> bool {
        self.warnings.iter().any(pred)
    }
}

/// Clamps `dt` to `(0, max_dt]`, recording a warning if it had to shrink.
///
/// Non-finite or non-positive requests integrate nothing.
pub(crate) fn clamp_dt(dt: f32, config: &SimConfig, warnings: &mut Vec<SimWarning>) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    if dt > config.max_dt {
        warnings.push(SimWarning::TimestepClamped {
            requested: dt,
            used: config.max_dt,
        });
        return config.max_dt;
    }
    dt
}

/// Position, velocity, height, and slope checks shared by both physics models.
pub(crate) fn stability_warnings(
    config: &SimConfig,
    before: (Vec3, Vec3),
    after: &BallState,
    terrain_delta: f32,
    slope_percent: f32,
    warnings: &mut Vec<SimWarning>,
) {
    let (prev_position, prev_velocity) = before;
    let distance = after.position.distance(prev_position);
    if distance > config.position_jump_warning {
        warnings.push(SimWarning::LargePositionJump { distance });
    }
    let delta = after.velocity.distance(prev_velocity);
    if delta > config.velocity_delta_warning {
        warnings.push(SimWarning::LargeVelocityDelta { delta });
    }
    if terrain_delta.abs() > config.height_discontinuity_warning {
        warnings.push(SimWarning::HeightDiscontinuity {
            delta: terrain_delta,
        });
    }
    if slope_percent > config.extreme_slope_percent {
        warnings.push(SimWarning::ExtremeSlope {
            percent: slope_percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_dt_records_warning() {
        let config = SimConfig::default();
        let mut warnings = Vec::new();
        assert_eq!(clamp_dt(0.01, &config, &mut warnings), 0.01);
        assert!(warnings.is_empty());
        assert_eq!(clamp_dt(0.5, &config, &mut warnings), config.max_dt);
        assert!(matches!(warnings[0], SimWarning::TimestepClamped { .. }));
        assert_eq!(clamp_dt(f32::NAN, &config, &mut warnings), 0.0);
        assert_eq!(clamp_dt(-1.0, &config, &mut warnings), 0.0);
    }

    #[test]
    fn stability_checks_flag_each_threshold() {
        let config = SimConfig::default();
        let mut after = BallState::at_rest(Vec3::new(1.0, 0.0, 0.0));
        after.velocity = Vec3::new(2.0, 0.0, 0.0);
        let mut warnings = Vec::new();
        stability_warnings(&config, (Vec3::ZERO, Vec3::ZERO), &after, 0.05, 45.0, &mut warnings);
        assert_eq!(warnings.len(), 4);

        warnings.clear();
        stability_warnings(
            &config,
            (after.position, after.velocity),
            &after,
            0.0,
            1.0,
            &mut warnings,
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn idle_telemetry_mirrors_state() {
        let ball = BallState::new(Vec3::ONE, Vec3::X);
        let t = StepTelemetry::idle(&ball);
        assert_eq!(t.dt, 0.0);
        assert_eq!(t.position, Vec3::ONE);
        assert_eq!(t.speed, 1.0);
        assert!(!t.has_warning(|w| matches!(w, SimWarning::OffGreen)));
    }
}
