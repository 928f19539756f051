//! Ball simulation: green-speed calibration, the two physics models, and cup mechanics.
//!
//! Both models implement [`BallSimulator`] over the same [`BallState`] and
//! [`Heightfield`](crate::surface::Heightfield), so a host picks one with
//! [`simulator_for`] and can switch between putts.
pub mod ball;
pub mod cup;
pub mod events;
pub mod putt;
pub mod rigid_model;
pub mod simulator;
pub mod speed;
pub mod surface_model;
pub mod telemetry;

pub use ball::{BallParams, BallPhase, BallState, SimConfig};
pub use cup::{check_capture, deflect, Cup, CupConfig, CUP_DEPTH, CUP_DIAMETER, RIM_THICKNESS};
pub use events::{EventSink, FnSink, SimEvent, VecSink};
pub use putt::{run_putt, PuttOutcome, PuttResult, PuttRunner};
pub use rigid_model::RigidBodySimulator;
pub use simulator::{simulator_for, BallSimulator, PhysicsModel};
pub use speed::{green_speed_from_rating, GreenSpeedPhysics, MEDIUM_DAMPING, MEDIUM_FRICTION};
pub use surface_model::SurfaceConstrainedSimulator;
pub use telemetry::{ForceBreakdown, SimWarning, StepTelemetry};
