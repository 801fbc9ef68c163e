pub mod error;
pub mod utils;
pub mod geometry;
pub mod douglas_peucker;
pub mod polyline_io;
pub mod export;
pub mod config;

pub use douglas_peucker::simplify;
pub use geometry::Point;
