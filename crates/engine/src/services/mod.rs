pub mod lifting_order;
pub mod plate_loader;
pub mod progression;
pub mod scoring;

pub use lifting_order::{current_lifter, order};
pub use plate_loader::{LoadedPlate, LoadedStack, load_bar, mark_already_loaded};
pub use scoring::{GlCoefficients, points, try_points};
