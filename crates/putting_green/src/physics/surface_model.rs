//! Surface-constrained model: planar integration with the ball pinned to the terrain.
use glam::{Vec2, Vec3};
use tracing::trace;

use super::ball::{BallParams, BallState, SimConfig};
use super::cup::Cup;
use super::events::EventSink;
use super::simulator::{
    begin_step, free_flight, resolve_cup, roll, settle, telemetry, update_cup_override,
    BallSimulator, PhysicsModel,
};
use super::speed::GreenSpeedPhysics;
use super::telemetry::{stability_warnings, ForceBreakdown, SimWarning, StepTelemetry};
use crate::error::Result;
use crate::surface::Heightfield;

/// Integrates the ball on the green plane and sets its height from the terrain.
///
/// Slope acceleration is `-g ∇h`; rolling resistance, linear damping, and quadratic drag
/// reduce speed without ever reversing the direction of travel.
#[derive(Clone, Debug, Default)]
pub struct SurfaceConstrainedSimulator {
    params: BallParams,
    speed: GreenSpeedPhysics,
    config: SimConfig,
}

impl SurfaceConstrainedSimulator {
    pub fn new(params: BallParams, speed: GreenSpeedPhysics, config: SimConfig) -> Result<Self> {
        params.validate()?;
        config.validate()?;
        Ok(Self {
            params,
            speed,
            config,
        })
    }

    pub fn speed(&self) -> &GreenSpeedPhysics {
        &self.speed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn roll_on_terrain(
        &self,
        state: &mut BallState,
        field: &Heightfield,
        dt: f32,
    ) -> ForceBreakdown {
        let g = self.params.gravity;
        let m = self.params.mass;
        let p = state.planar_position();
        let gradient = field.gradient_at(p);

        let slope_accel = -g * gradient;
        let mut v = state.planar_velocity() + slope_accel * dt;
        let s = v.length();
        let rolling = self.speed.friction * g;
        let drag = self.speed.damping * s + self.config.quadratic_drag * s * s;
        let new_speed = (s - (rolling + drag) * dt).max(0.0);
        let dir = v.normalize_or_zero();
        v = dir * new_speed;

        let next = p + v * dt;
        let next_gradient = field.gradient_at(next);
        state.position = Vec3::new(
            next.x,
            field.height_at(next) + self.params.radius,
            next.y,
        );
        state.velocity = Vec3::new(v.x, next_gradient.dot(v), v.y);
        state.in_contact = true;
        roll(state, field.normal_at(next), self.params.radius, dt);

        let planar = |a: Vec2| Vec3::new(a.x, 0.0, a.y);
        ForceBreakdown {
            gravity: planar(slope_accel) * m,
            friction: planar(-dir * rolling) * m,
            drag: planar(-dir * drag) * m,
            normal: field.normal_at(p) * (m * g),
        }
    }

    fn repin(&self, state: &mut BallState, field: &Heightfield) {
        let p = state.planar_position();
        let v = state.planar_velocity();
        state.position.y = field.height_at(p) + self.params.radius;
        state.velocity = Vec3::new(v.x, field.gradient_at(p).dot(v), v.y);
        state.in_contact = true;
    }
}

impl BallSimulator for SurfaceConstrainedSimulator {
    fn model(&self) -> PhysicsModel {
        PhysicsModel::SurfaceConstrained
    }

    fn params(&self) -> &BallParams {
        &self.params
    }

    fn step_with_events(
        &self,
        state: &mut BallState,
        field: &Heightfield,
        cup: Option<&Cup>,
        dt: f32,
        sink: &mut dyn EventSink,
    ) -> StepTelemetry {
        let mut warnings = Vec::new();
        let Some(dt) = begin_step(state, &self.config, dt, sink, &mut warnings) else {
            let mut idle = StepTelemetry::idle(state);
            idle.warnings = warnings;
            return idle;
        };

        let before = (state.position, state.velocity);
        let terrain_before = field.try_height_at(state.planar_position());
        let was_overridden = state.cup_override && cup.is_some();

        let forces = if was_overridden {
            free_flight(state, &self.params, dt)
        } else {
            self.roll_on_terrain(state, field, dt)
        };

        update_cup_override(state, cup, sink);
        if was_overridden && !state.cup_override {
            self.repin(state, field);
        }
        if let (true, Some(cup)) = (state.cup_override, cup) {
            resolve_cup(state, before.0, cup, sink);
        } else {
            settle(state, field, &self.speed, &self.config, sink);
        }

        let p = state.planar_position();
        let slope_percent = field.slope_percent_at(p);
        let terrain_after = field.try_height_at(p);
        if terrain_after.is_none() {
            warnings.push(SimWarning::OffGreen);
        }
        let in_cup = was_overridden || state.cup_override;
        let terrain_delta = match (in_cup, terrain_before, terrain_after) {
            (false, Some(a), Some(b)) => b - a,
            _ => 0.0,
        };
        stability_warnings(
            &self.config,
            before,
            state,
            terrain_delta,
            slope_percent,
            &mut warnings,
        );
        trace!(
            "Surface step dt={:.4} pos={} speed={:.3} phase={:?}.",
            dt,
            state.position,
            state.speed(),
            state.phase
        );
        telemetry(state, dt, forces, slope_percent, warnings)
    }
}
