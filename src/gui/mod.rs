pub mod app;
pub mod texture;

pub use app::MandelzoomApp;
