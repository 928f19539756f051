//! The [`BallSimulator`] capability and the step scaffolding both physics models share.
//!
//! A step never fails. Instability is reported as [`SimWarning`]s on the returned
//! [`StepTelemetry`]; state transitions are reported as [`SimEvent`]s to the caller's sink.
use std::fmt;

use glam::{Quat, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ball::{BallParams, BallPhase, BallState, SimConfig};
use super::cup::{check_capture, deflect, Cup};
use super::events::{EventSink, SimEvent};
use super::rigid_model::RigidBodySimulator;
use super::speed::GreenSpeedPhysics;
use super::surface_model::SurfaceConstrainedSimulator;
use super::telemetry::{clamp_dt, ForceBreakdown, SimWarning, StepTelemetry};
use crate::error::Result;
use crate::surface::Heightfield;

/// Selects a physics model.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PhysicsModel {
    /// Planar integration with the ball pinned to the terrain.
    #[default]
    SurfaceConstrained,
    /// Full 3-D integration with terrain contact resolution.
    RigidBody,
}

impl fmt::Display for PhysicsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceConstrained => f.write_str("surface-constrained"),
            Self::RigidBody => f.write_str("rigid-body"),
        }
    }
}

/// Advances a ball over a heightfield.
///
/// Implementations share [`BallState`] and [`Heightfield`] so a host can swap models
/// between putts. Balls that are at rest, stopped, or captured are left untouched.
pub trait BallSimulator {
    fn model(&self) -> PhysicsModel;

    fn params(&self) -> &BallParams;

    /// Advances `state` by `dt` seconds (clamped to the configured maximum), reporting
    /// transitions to `sink`.
    fn step_with_events(
        &self,
        state: &mut BallState,
        field: &Heightfield,
        cup: Option<&Cup>,
        dt: f32,
        sink: &mut dyn EventSink,
    ) -> StepTelemetry;

    fn step(
        &self,
        state: &mut BallState,
        field: &Heightfield,
        cup: Option<&Cup>,
        dt: f32,
    ) -> StepTelemetry {
        self.step_with_events(state, field, cup, dt, &mut ())
    }
}

/// Builds the simulator for `model`.
pub fn simulator_for(
    model: PhysicsModel,
    params: BallParams,
    speed: GreenSpeedPhysics,
    config: SimConfig,
) -> Result<Box<dyn BallSimulator>> {
    Ok(match model {
        PhysicsModel::SurfaceConstrained => {
            Box::new(SurfaceConstrainedSimulator::new(params, speed, config)?)
        }
        PhysicsModel::RigidBody => Box::new(RigidBodySimulator::new(params, speed, config)?),
    })
}

/// Clamps `dt` and reports a pending launch. `None` when the step must leave `state` alone.
pub(crate) fn begin_step(
    state: &mut BallState,
    config: &SimConfig,
    dt: f32,
    sink: &mut dyn EventSink,
    warnings: &mut Vec<SimWarning>,
) -> Option<f32> {
    if !state.is_moving() {
        return None;
    }
    let dt = clamp_dt(dt, config, warnings);
    if dt == 0.0 {
        return None;
    }
    if !state.launch_reported {
        state.launch_reported = true;
        debug!("Ball launched at {:.3} m/s.", state.speed());
        sink.send(SimEvent::Launched {
            velocity: state.velocity,
        });
    }
    Some(dt)
}

/// Ballistic motion under world-down gravity while the cup has taken over collision.
pub(crate) fn free_flight(state: &mut BallState, params: &BallParams, dt: f32) -> ForceBreakdown {
    let gravity = Vec3::new(0.0, -params.gravity, 0.0);
    state.velocity += gravity * dt;
    state.position += state.velocity * dt;
    state.in_contact = false;
    ForceBreakdown {
        gravity: gravity * params.mass,
        ..Default::default()
    }
}

/// Hands terrain collision to the cup inside its capture radius and back outside it.
pub(crate) fn update_cup_override(
    state: &mut BallState,
    cup: Option<&Cup>,
    sink: &mut dyn EventSink,
) {
    let inside = cup.is_some_and(|c| c.overrides_terrain(state.position));
    if inside && !state.cup_override {
        state.cup_override = true;
        debug!("Ball entered the cup zone; terrain collision disabled.");
        sink.send(SimEvent::CupEntered);
    } else if !inside && state.cup_override {
        state.cup_override = false;
        debug!("Ball left the cup zone; terrain collision restored.");
        sink.send(SimEvent::CupExited);
    }
}

/// Edge contact, rim deflection, cup walls, and capture for a ball under cup override
/// that moved from `previous` this step.
pub(crate) fn resolve_cup(
    state: &mut BallState,
    previous: Vec3,
    cup: &Cup,
    sink: &mut dyn EventSink,
) {
    let edge_hit = cup.edge_contact(previous, state.position);
    if let Some(contact) = edge_hit {
        state.position = contact;
        state.in_contact = true;
    }
    if let Some(velocity) = deflect(state.position, state.velocity, cup) {
        let speed_before = state.speed();
        state.velocity = velocity;
        debug!(
            "Lip-out: speed {:.3} -> {:.3} m/s.",
            speed_before,
            velocity.length()
        );
        sink.send(SimEvent::LipOut {
            speed_before,
            speed_after: velocity.length(),
        });
    } else if edge_hit.is_some() {
        if let Some(n) = cup.edge_normal(state.position) {
            let vn = state.velocity.dot(n);
            if vn < 0.0 {
                state.velocity -= n * vn;
            }
        }
    }
    if cup.resolve_interior(state, previous) {
        state.in_contact = true;
    }
    if check_capture(state.position, state.velocity, cup) {
        state.phase = BallPhase::Captured;
        state.velocity = Vec3::ZERO;
        state.angular_velocity = Vec3::ZERO;
        debug!("Ball captured at {}.", state.position);
        sink.send(SimEvent::Captured {
            position: state.position,
        });
    }
}

/// Stops a slow ball whose slope pull is within static friction. The stop is reported
/// once per launch.
pub(crate) fn settle(
    state: &mut BallState,
    field: &Heightfield,
    speed: &GreenSpeedPhysics,
    config: &SimConfig,
    sink: &mut dyn EventSink,
) {
    if state.phase != BallPhase::Moving || state.speed() >= config.stop_speed {
        return;
    }
    if field.gradient_at(state.planar_position()).length() > speed.friction {
        return;
    }
    state.phase = BallPhase::Stopped;
    state.velocity = Vec3::ZERO;
    state.angular_velocity = Vec3::ZERO;
    if !state.stop_reported {
        state.stop_reported = true;
        debug!("Ball stopped at {}.", state.position);
        sink.send(SimEvent::Stopped {
            position: state.position,
        });
    }
}

/// Rolling without slip: spin about `normal × v̂` at `|v| / radius`.
pub(crate) fn roll(state: &mut BallState, normal: Vec3, radius: f32, dt: f32) {
    let axis = normal.cross(state.velocity).normalize_or_zero();
    if axis == Vec3::ZERO {
        state.angular_velocity = Vec3::ZERO;
        return;
    }
    let omega = state.speed() / radius;
    state.angular_velocity = axis * omega;
    state.rotation = (Quat::from_axis_angle(axis, omega * dt) * state.rotation).normalize();
}

/// Assembles telemetry from the post-step state.
pub(crate) fn telemetry(
    state: &BallState,
    dt: f32,
    forces: ForceBreakdown,
    slope_percent: f32,
    warnings: Vec<SimWarning>,
) -> StepTelemetry {
    StepTelemetry {
        dt,
        position: state.position,
        velocity: state.velocity,
        speed: state.speed(),
        forces,
        slope_percent,
        rotation_axis: state.angular_velocity.normalize_or_zero(),
        angular_speed: state.angular_velocity.length(),
        in_contact: state.in_contact,
        cup_override: state.cup_override,
        phase: state.phase,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::physics::events::VecSink;
    use crate::physics::speed::green_speed_from_rating;
    use crate::surface::{generate_outline, OutlineShape, OutlineSpec, SdfTexture};

    fn flat_field() -> Heightfield {
        let spec = OutlineSpec::new(OutlineShape::Round, Vec2::new(4.8, 4.8)).with_jitter(0.0);
        let outline = generate_outline(0, &spec).unwrap();
        Heightfield::flat(&SdfTexture::build(&outline, 65, 10.0).unwrap())
    }

    fn both_models() -> Vec<Box<dyn BallSimulator>> {
        [PhysicsModel::SurfaceConstrained, PhysicsModel::RigidBody]
            .into_iter()
            .map(|m| {
                simulator_for(
                    m,
                    BallParams::default(),
                    green_speed_from_rating(10.0),
                    SimConfig::default(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn selected_model_is_reported() {
        let models: Vec<_> = both_models().iter().map(|s| s.model()).collect();
        assert_eq!(
            models,
            vec![PhysicsModel::SurfaceConstrained, PhysicsModel::RigidBody]
        );
        assert_eq!(PhysicsModel::RigidBody.to_string(), "rigid-body");
    }

    #[test]
    fn putt_on_flat_green_stops_once_without_discontinuity() {
        let field = flat_field();
        for sim in both_models() {
            let r = sim.params().radius;
            let mut ball = BallState::new(Vec3::new(-3.0, r, 0.0), Vec3::new(3.0, 0.0, 0.0));
            let mut sink = VecSink::new();
            let mut steps = 0;
            while ball.is_moving() && steps < 600 {
                let t = sim.step_with_events(&mut ball, &field, None, 1.0 / 60.0, &mut sink);
                assert!(
                    !t.has_warning(|w| matches!(w, SimWarning::HeightDiscontinuity { .. })),
                    "{}",
                    sim.model()
                );
                steps += 1;
            }
            assert_eq!(ball.phase, BallPhase::Stopped, "{}", sim.model());
            assert!(steps < 400, "{} took {steps} steps", sim.model());
            assert!(ball.position.x > -1.0 && ball.position.x < 2.0);

            for _ in 0..5 {
                sim.step_with_events(&mut ball, &field, None, 1.0 / 60.0, &mut sink);
            }
            assert_eq!(sink.count(|e| matches!(e, SimEvent::Stopped { .. })), 1);
            assert_eq!(sink.count(|e| matches!(e, SimEvent::Launched { .. })), 1);
        }
    }

    #[test]
    fn stopped_ball_is_untouched() {
        let field = flat_field();
        for sim in both_models() {
            let mut ball = BallState::at_rest(Vec3::new(0.0, 0.02135, 0.0));
            ball.phase = BallPhase::Stopped;
            let before = ball.clone();
            for _ in 0..10 {
                let t = sim.step(&mut ball, &field, None, 1.0 / 30.0);
                assert_eq!(t.dt, 0.0);
            }
            assert_eq!(ball, before);
        }
    }

    #[test]
    fn long_frames_are_clamped() {
        let field = flat_field();
        for sim in both_models() {
            let mut ball = BallState::new(Vec3::new(0.0, 0.02135, 0.0), Vec3::new(1.0, 0.0, 0.0));
            let t = sim.step(&mut ball, &field, None, 0.5);
            assert_eq!(t.dt, SimConfig::default().max_dt);
            assert!(t.has_warning(|w| matches!(w, SimWarning::TimestepClamped { .. })));
        }
    }

    #[test]
    fn slow_putt_at_the_cup_drops_in() {
        let field = flat_field();
        let cup = Cup::place(&field, Vec2::new(0.5, 0.0), Default::default());
        for sim in both_models() {
            let r = sim.params().radius;
            let mut ball = BallState::new(Vec3::new(0.0, r, 0.0), Vec3::new(1.2, 0.0, 0.0));
            let mut sink = VecSink::new();
            for _ in 0..600 {
                if ball.is_finished() {
                    break;
                }
                sim.step_with_events(&mut ball, &field, Some(&cup), 1.0 / 120.0, &mut sink);
            }
            assert_eq!(ball.phase, BallPhase::Captured, "{}", sim.model());
            assert_eq!(sink.count(|e| matches!(e, SimEvent::CupEntered)), 1);
            assert_eq!(sink.count(|e| matches!(e, SimEvent::Stopped { .. })), 0);
        }
    }
}
