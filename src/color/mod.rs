pub mod palettes;

#[allow(unused_imports)]
pub use palettes::{color_for_sample, pack_rgb, unpack_rgb, BACKGROUND};
