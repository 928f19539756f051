#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{init_tracing, render_green_to_png, RenderConfig};
