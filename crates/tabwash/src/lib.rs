//! Tabwash: schema-free cleaning for tabular datasets.
//!
//! Tabwash loads a raw table of unknown schema, infers a semantic type for
//! every column by statistical sampling, and runs cleaning steps on the
//! result: missing value repair, row removal, type overrides, scaling and
//! outlier ranking. The cleaned data can be exported as CSV or ARFF.
//!
//! # Core Principles
//!
//! - **Schema-free**: Column types come from the data, not from declarations
//! - **Snapshots**: Every step produces a new dataset; failed steps change nothing
//! - **Pluggable**: Cleaning, scaling and detection are traits with defaults
//!
//! # Example
//!
//! ```no_run
//! use tabwash::{DataContainer, ExportFormat, MissingStrategy};
//!
//! let mut container = DataContainer::from_path("measurements.csv").unwrap();
//! println!("Types: {:?}", container.get_dtypes());
//!
//! container.missing(MissingStrategy::Mean, &[]).unwrap();
//! let csv = container.export(ExportFormat::Csv).unwrap();
//! println!("{}", csv);
//! ```

pub mod clean;
pub mod data;
pub mod error;
pub mod export;
pub mod inference;
pub mod input;
pub mod outlier;
pub mod stats;

mod container;

pub use crate::container::{Band, ContainerBuilder, ContainerConfig, DataContainer, DataScore};
pub use clean::{MissingStrategy, MissingValueHandler, NormalizeStrategy, Normalizer, ScaleRange};
pub use data::{Column, Dataset, SemanticType, Value};
pub use error::{CoercionError, Result, WashError};
pub use export::ExportFormat;
pub use inference::{discover_type_heuristic, InferenceConfig, TypeInferencer};
pub use input::{assign_parser, ParserConfig, ParserHandle, SourceDescriptor, SourceMetadata};
pub use outlier::{OutlierAlgorithm, OutlierDetector, OutlierReport};
