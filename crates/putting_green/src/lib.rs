#![forbid(unsafe_code)]
//! putting_green: procedural putting-green generation and golf-ball simulation.
//!
//! Modules:
//! - surface: outline, signed-distance field, and heightfield synthesis
//! - placement: pin-flat detection, start/cup placement, difficulty, and validation
//! - physics: green-speed calibration, surface-constrained and rigid-body ball models, cup
//! - green: the one-shot generation pipeline tying the above together
//!
//! Coordinates are y-up. Planar positions are `Vec2(x, z)`.
pub mod error;
pub mod green;
pub mod physics;
pub mod placement;
pub mod surface;

/// Convenient re-exports for common types. Import with `use putting_green::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::green::{generate, generate_with_config, GeneratedGreen, GenerationConfig};
    pub use crate::physics::{
        check_capture, deflect, green_speed_from_rating, run_putt, simulator_for, BallParams,
        BallPhase, BallSimulator, BallState, Cup, CupConfig, EventSink, FnSink,
        GreenSpeedPhysics, PhysicsModel, PuttOutcome, PuttResult, PuttRunner,
        RigidBodySimulator, SimConfig, SimEvent, SimWarning, StepTelemetry,
        SurfaceConstrainedSimulator, VecSink,
    };
    pub use crate::placement::{
        DifficultyRating, DifficultyTier, PinCandidate, PinFlatConfig, PlacementConfig,
        StartCupPlacement, ValidationConfig, ValidationReport, ValidationRule,
    };
    pub use crate::surface::{
        generate_outline, CrownParams, FalseFrontParams, GreenOutline, GreenSurfaceSpec,
        Heightfield, OutlineShape, OutlineSpec, RidgeParams, SdfTexture, SwaleParams,
        TierParams, UndulationParams,
    };
}
