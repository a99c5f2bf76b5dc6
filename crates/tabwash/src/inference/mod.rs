//! Schema-free semantic type inference.

mod heuristic;

pub use heuristic::{
    classify_value, discover_type_heuristic, infer_column_type, looks_like_date, InferenceConfig,
    TypeInferencer, Votes,
};
