mod bounding_box;
mod types;

pub use bounding_box::{Axis, BoundingBox};
pub use types::*;
