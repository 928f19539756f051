//! Green surface generation: outline, signed-distance field, and heightfield.
//!
//! Data flows one way: [`GreenOutline`] → [`SdfTexture`] → [`Heightfield`]. Every product
//! is read-only after construction and may be shared across simulation instances.
pub mod features;
pub mod grid;
pub mod heightfield;
pub mod outline;
pub mod raster;
pub mod sdf;
pub mod seed;
pub mod spec;
pub mod turf;

pub use features::FeatureContext;
pub use grid::Grid;
pub use heightfield::Heightfield;
pub use outline::{generate_outline, GreenOutline, OutlineShape, OutlineSpec};
pub use raster::Raster;
pub use sdf::SdfTexture;
pub use spec::{
    CrownParams, FalseFrontParams, GreenSurfaceSpec, RidgeParams, SwaleParams, TierParams,
    UndulationParams,
};
