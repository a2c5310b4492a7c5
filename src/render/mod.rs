pub mod bands;
pub mod escape_time;

pub use bands::{Band, BandScheduler};
