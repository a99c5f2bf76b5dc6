//! Cleaning collaborators: missing value repair and scaling.

mod missing;
mod normalize;

pub use missing::{Imputer, MissingStrategy, MissingValueHandler};
pub use normalize::{NormalizeStrategy, Normalizer, ScaleRange, Scaler};
