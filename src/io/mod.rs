pub mod frames;

pub use frames::{FrameFormat, FrameSink};
