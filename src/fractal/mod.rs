pub mod types;
pub mod definitions;
pub mod iterations;

pub use types::{EscapeSample, FrameParams, Viewport};
pub use iterations::iterate_point;
