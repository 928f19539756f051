//! Full 3-D model: world-down gravity with heightfield contact resolution.
use glam::Vec3;
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

/// Integrates the ball in 3-D and resolves terrain contact against the heightfield.
///
/// In contact only the tangential part of gravity is integrated. Penetration beyond the
/// contact tolerance is resolved by a restitution impulse for fast downward normal
/// velocity and by partial positional correction otherwise; near-zero penetration with a
/// slow normal velocity counts as resting contact and just drops the normal component.
#[derive(Clone, Debug, Default)]
pub struct RigidBodySimulator {
    params: BallParams,
    speed: GreenSpeedPhysics,
    config: SimConfig,
}

impl RigidBodySimulator {
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

    fn integrate(&self, state: &mut BallState, field: &Heightfield, dt: f32) -> ForceBreakdown {
        let m = self.params.mass;
        let gravity = Vec3::new(0.0, -self.params.gravity, 0.0);
        let p = state.planar_position();
        let n = field.normal_at(p);
        let gap = state.position.y - (field.height_at(p) + self.params.radius);
        state.in_contact = gap <= self.config.contact_tolerance;

        let mut forces = ForceBreakdown {
            gravity: gravity * m,
            ..Default::default()
        };
        if state.in_contact {
            let normal_part = n * gravity.dot(n);
            state.velocity += (gravity - normal_part) * dt;

            let vn = state.velocity.dot(n);
            let tangential = state.velocity - n * vn;
            let s = tangential.length();
            let support = gravity.dot(n).abs();
            let rolling = self.speed.friction * support;
            let drag = self.speed.damping * s + self.config.quadratic_drag * s * s;
            let new_speed = (s - (rolling + drag) * dt).max(0.0);
            let dir = tangential.normalize_or_zero();
            state.velocity = n * vn + dir * new_speed;

            forces.normal = -normal_part * m;
            forces.friction = -dir * rolling * m;
            forces.drag = -dir * drag * m;
        } else {
            state.velocity += gravity * dt;
        }
        state.position += state.velocity * dt;
        forces
    }

    fn resolve_terrain(&self, state: &mut BallState, field: &Heightfield, dt: f32) {
        let p = state.planar_position();
        let n = field.normal_at(p);
        let penetration = field.height_at(p) + self.params.radius - state.position.y;
        let vn = state.velocity.dot(n);

        if penetration > self.config.contact_tolerance {
            if vn < -self.config.bounce_threshold {
                state.velocity -= n * vn * (1.0 + self.config.terrain_restitution);
                state.position.y += penetration;
            } else {
                state.position.y += penetration * self.config.correction_fraction;
                if vn < 0.0 {
                    state.velocity -= n * vn;
                }
            }
            state.in_contact = true;
        } else if penetration > -self.config.contact_tolerance {
            if vn.abs() < self.config.resting_normal_speed {
                state.velocity -= n * vn;
            }
            state.in_contact = true;
        } else {
            state.in_contact = false;
        }

        if state.in_contact {
            roll(state, n, self.params.radius, dt);
        }
    }
}

impl BallSimulator for RigidBodySimulator {
    fn model(&self) -> PhysicsModel {
        PhysicsModel::RigidBody
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
            let forces = self.integrate(state, field, dt);
            self.resolve_terrain(state, field, dt);
            forces
        };

        update_cup_override(state, cup, sink);
        if let (true, Some(cup)) = (state.cup_override, cup) {
            resolve_cup(state, before.0, cup, sink);
        } else if state.in_contact {
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
            "Rigid step dt={:.4} pos={} speed={:.3} contact={} phase={:?}.",
            dt,
            state.position,
            state.speed(),
            state.in_contact,
            state.phase
        );
        telemetry(state, dt, forces, slope_percent, warnings)
    }
}
