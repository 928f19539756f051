//! Runs a putt from launch to completion with a hard step cap.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ball::{BallPhase, BallState};
use super::cup::Cup;
use super::events::{EventSink, SimEvent};
use super::simulator::BallSimulator;
use super::telemetry::SimWarning;
use crate::surface::Heightfield;

pub const DEFAULT_PUTT_DT: f32 = 1.0 / 120.0;
pub const DEFAULT_MAX_STEPS: usize = 120 * 60;

/// How a putt ended.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PuttResult {
    Holed,
    Stopped,
    /// The step cap was reached while the ball was still moving.
    StepLimit,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PuttOutcome {
    pub result: PuttResult,
    pub steps: usize,
    pub final_position: Vec3,
    /// Path length travelled by the ball centre.
    pub distance_rolled: f32,
    pub lip_outs: usize,
    /// Every warning raised during the putt, in step order.
    pub warnings: Vec<SimWarning>,
    /// Ball centre after each step; empty unless recording was requested.
    pub trajectory: Vec<Vec3>,
}

/// Drives a [`BallSimulator`] at a fixed timestep.
pub struct PuttRunner<'a> {
    simulator: &'a dyn BallSimulator,
    dt: f32,
    max_steps: usize,
    record_trajectory: bool,
}

impl<'a> PuttRunner<'a> {
    pub fn new(simulator: &'a dyn BallSimulator) -> Self {
        Self {
            simulator,
            dt: DEFAULT_PUTT_DT,
            max_steps: DEFAULT_MAX_STEPS,
            record_trajectory: false,
        }
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_trajectory(mut self, record: bool) -> Self {
        self.record_trajectory = record;
        self
    }

    /// Steps `state` until it is holed, stopped, or the step cap is reached.
    pub fn run(
        &self,
        state: &mut BallState,
        field: &Heightfield,
        cup: Option<&Cup>,
        sink: &mut dyn EventSink,
    ) -> PuttOutcome {
        let mut tally = Tally {
            inner: sink,
            lip_outs: 0,
        };
        let mut warnings = Vec::new();
        let mut trajectory = Vec::new();
        let mut distance_rolled = 0.0;
        let mut steps = 0;

        while state.is_moving() && steps < self.max_steps {
            let previous = state.position;
            let telemetry = self
                .simulator
                .step_with_events(state, field, cup, self.dt, &mut tally);
            steps += 1;
            distance_rolled += state.position.distance(previous);
            warnings.extend(telemetry.warnings);
            if self.record_trajectory {
                trajectory.push(state.position);
            }
        }

        let result = match state.phase {
            BallPhase::Captured => PuttResult::Holed,
            BallPhase::Moving => PuttResult::StepLimit,
            BallPhase::Stopped | BallPhase::AtRest => PuttResult::Stopped,
        };
        if result == PuttResult::StepLimit {
            debug!("Putt hit the step cap of {} steps.", self.max_steps);
        }
        info!(
            "Putt finished: {:?} after {} steps, rolled {:.2} m, {} lip-outs.",
            result, steps, distance_rolled, tally.lip_outs
        );
        PuttOutcome {
            result,
            steps,
            final_position: state.position,
            distance_rolled,
            lip_outs: tally.lip_outs,
            warnings,
            trajectory,
        }
    }
}

/// Launches a ball from `start` with `velocity` and runs it with default runner settings.
pub fn run_putt(
    simulator: &dyn BallSimulator,
    field: &Heightfield,
    cup: Option<&Cup>,
    start: Vec3,
    velocity: Vec3,
) -> PuttOutcome {
    let mut state = BallState::new(start, velocity);
    PuttRunner::new(simulator).run(&mut state, field, cup, &mut ())
}

struct Tally<'s> {
    inner: &'s mut dyn EventSink,
    lip_outs: usize,
}

impl EventSink for Tally<'_> {
    fn send(&mut self, event: SimEvent) {
        if matches!(event, SimEvent::LipOut { .. }) {
            self.lip_outs += 1;
        }
        self.inner.send(event);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::physics::ball::{BallParams, SimConfig};
    use crate::physics::cup::CupConfig;
    use crate::physics::events::VecSink;
    use crate::physics::simulator::{simulator_for, PhysicsModel};
    use crate::physics::speed::green_speed_from_rating;
    use crate::physics::surface_model::SurfaceConstrainedSimulator;
    use crate::surface::{generate_outline, OutlineShape, OutlineSpec, SdfTexture};

    fn flat_field() -> Heightfield {
        let spec = OutlineSpec::new(OutlineShape::Round, Vec2::new(4.8, 4.8)).with_jitter(0.0);
        let outline = generate_outline(0, &spec).unwrap();
        Heightfield::flat(&SdfTexture::build(&outline, 65, 10.0).unwrap())
    }

    #[test]
    fn putt_that_comes_up_short_stops() {
        let field = flat_field();
        let sim = SurfaceConstrainedSimulator::default();
        let r = sim.params().radius;
        let cup = Cup::place(&field, Vec2::new(3.0, 0.0), CupConfig::default());
        let start = Vec3::new(-3.0, r, 0.0);
        let outcome = run_putt(&sim, &field, Some(&cup), start, Vec3::X * 2.0);
        assert_eq!(outcome.result, PuttResult::Stopped);
        assert!(outcome.distance_rolled > 1.0);
        assert!(outcome.final_position.x < 3.0);
        assert!(outcome.trajectory.is_empty());
    }

    #[test]
    fn step_cap_bounds_the_run() {
        let field = flat_field();
        let sim = SurfaceConstrainedSimulator::default();
        let r = sim.params().radius;
        let mut ball = BallState::new(Vec3::new(0.0, r, 0.0), Vec3::X * 2.0);
        let outcome = PuttRunner::new(&sim)
            .with_max_steps(5)
            .with_trajectory(true)
            .run(&mut ball, &field, None, &mut ());
        assert_eq!(outcome.result, PuttResult::StepLimit);
        assert_eq!(outcome.steps, 5);
        assert_eq!(outcome.trajectory.len(), 5);
    }

    #[test]
    fn holed_putt_reports_capture() {
        let field = flat_field();
        let sim = SurfaceConstrainedSimulator::default();
        let r = sim.params().radius;
        let cup = Cup::place(&field, Vec2::new(1.0, 0.0), CupConfig::default());
        let mut ball = BallState::new(Vec3::new(0.5, r, 0.0), Vec3::X * 1.2);
        let mut sink = VecSink::new();
        let outcome = PuttRunner::new(&sim).run(&mut ball, &field, Some(&cup), &mut sink);
        assert_eq!(outcome.result, PuttResult::Holed);
        assert_eq!(sink.count(|e| matches!(e, SimEvent::Captured { .. })), 1);
        assert_eq!(outcome.lip_outs, 0);
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

    fn cup_at_origin(field: &Heightfield, rim: bool) -> Cup {
        Cup::place(field, Vec2::ZERO, CupConfig::default().with_rim_collision(rim))
    }

    #[test]
    fn firm_putt_through_the_centre_lips_out() {
        let field = flat_field();
        let cup = cup_at_origin(&field, true);
        for sim in both_models() {
            let r = sim.params().radius;
            let mut ball = BallState::new(Vec3::new(-0.5, r, 0.0), Vec3::X * 3.0);
            let mut sink = VecSink::new();
            let outcome =
                PuttRunner::new(sim.as_ref()).run(&mut ball, &field, Some(&cup), &mut sink);

            assert!(outcome.lip_outs >= 1, "{}", sim.model());
            for event in sink.as_slice() {
                if let SimEvent::LipOut {
                    speed_before,
                    speed_after,
                } = event
                {
                    assert!(speed_after <= speed_before, "{}", sim.model());
                    assert!(*speed_before > cup.config.capture_speed);
                }
            }
        }
    }

    #[test]
    fn near_miss_keeps_its_speed_and_line() {
        let field = flat_field();
        let cup = cup_at_origin(&field, true);
        for sim in both_models() {
            let r = sim.params().radius;
            let start = Vec3::new(-0.5, r, 0.06);
            let launch = Vec3::X * 3.0;
            let mut sink = VecSink::new();
            let mut ball = BallState::new(start, launch);
            let past_cup =
                PuttRunner::new(sim.as_ref()).run(&mut ball, &field, Some(&cup), &mut sink);
            let no_cup = run_putt(sim.as_ref(), &field, None, start, launch);

            assert_eq!(past_cup.result, PuttResult::Stopped, "{}", sim.model());
            assert_eq!(past_cup.lip_outs, 0);
            assert_eq!(sink.count(|e| matches!(e, SimEvent::CupEntered)), 1);
            assert!((past_cup.final_position.z - 0.06).abs() < 1e-4);
            assert!(past_cup.final_position.x > 2.0);
            assert!((past_cup.final_position.x - no_cup.final_position.x).abs() < 0.1);
        }
    }

    #[test]
    fn rim_setting_does_not_decide_a_near_miss() {
        let field = flat_field();
        for sim in both_models() {
            let r = sim.params().radius;
            for offset in [0.058, 0.062] {
                let start = Vec3::new(-0.2, r, offset);
                let launch = Vec3::X * 0.9;
                let rim_on = cup_at_origin(&field, true);
                let rim_off = cup_at_origin(&field, false);
                let with_rim = run_putt(sim.as_ref(), &field, Some(&rim_on), start, launch);
                let without_rim = run_putt(sim.as_ref(), &field, Some(&rim_off), start, launch);

                let label = format!("{} at {}", sim.model(), offset);
                assert_eq!(with_rim.result, PuttResult::Stopped, "{label}");
                assert_eq!(without_rim.result, PuttResult::Stopped, "{label}");
                assert!(with_rim.final_position.x > 0.05);
                assert!((with_rim.final_position - without_rim.final_position).length() < 1e-6);
                assert!((without_rim.final_position.z - offset).abs() < 1e-4);
            }
        }
    }
}
