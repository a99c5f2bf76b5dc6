//! In-memory dataset representation: values, columns and snapshots.

mod column;
mod dataset;
mod types;
mod value;

pub use column::Column;
pub use dataset::Dataset;
pub use types::SemanticType;
pub use value::{Value, ValueKey};
