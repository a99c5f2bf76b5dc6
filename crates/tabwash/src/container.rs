//! The data container: one loaded dataset and the operations on it.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clean::{
    Imputer, MissingStrategy, MissingValueHandler, NormalizeStrategy, Normalizer, ScaleRange,
    Scaler,
};
use crate::data::{Dataset, SemanticType};
use crate::error::{Result, WashError};
use crate::export::{export_arff, export_csv, ExportFormat};
use crate::inference::{InferenceConfig, TypeInferencer};
use crate::input::{assign_parser, ParserConfig, ParserHandle, SourceDescriptor, SourceMetadata};
use crate::outlier::{EnsembleDetector, OutlierAlgorithm, OutlierDetector, OutlierReport};

/// Configuration for a [`DataContainer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Type inference configuration.
    pub inference: InferenceConfig,
    /// Seed for sampling and randomized detectors (None = entropy).
    pub seed: Option<u64>,
    /// Rows returned by `preview`.
    pub preview_rows: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            inference: InferenceConfig::default(),
            seed: None,
            preview_rows: 5,
        }
    }
}

impl ContainerConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| WashError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Quality band of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    A,
    B,
    C,
}

impl Band {
    fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Band::A
        } else if score >= 0.6 {
            Band::B
        } else {
            Band::C
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Band::A => "A",
            Band::B => "B",
            Band::C => "C",
        };
        f.write_str(s)
    }
}

/// Summary of dataset quality computed by [`DataContainer::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataScore {
    /// Share of cells that are present (0.0-1.0).
    pub completeness: f64,
    /// Share of columns with a type more specific than object (0.0-1.0).
    pub typed_ratio: f64,
    /// Weighted score (0.0-1.0).
    pub score: f64,
    pub band: Band,
}

impl DataScore {
    pub fn compute(dataset: &Dataset) -> Self {
        let cells = dataset.row_count() * dataset.column_count();
        let completeness = if cells == 0 {
            1.0
        } else {
            1.0 - dataset.missing_count() as f64 / cells as f64
        };
        let typed_ratio = if dataset.column_count() == 0 {
            0.0
        } else {
            let typed = dataset
                .columns()
                .iter()
                .filter(|c| c.dtype != SemanticType::Object)
                .count();
            typed as f64 / dataset.column_count() as f64
        };
        let score = 0.7 * completeness + 0.3 * typed_ratio;
        Self {
            completeness,
            typed_ratio,
            score,
            band: Band::from_score(score),
        }
    }
}

/// Builds a [`DataContainer`] from exactly one data source.
#[derive(Default)]
pub struct ContainerBuilder {
    source: Option<SourceDescriptor>,
    dataset: Option<Dataset>,
    name: Option<String>,
    config: ContainerConfig,
    missing_handler: Option<Arc<dyn MissingValueHandler>>,
    normalizer: Option<Arc<dyn Normalizer>>,
    outlier_detector: Option<Arc<dyn OutlierDetector>>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a source descriptor.
    pub fn source(mut self, source: SourceDescriptor) -> Self {
        self.source = Some(source);
        self
    }

    /// Load from a file on disk.
    pub fn path(self, path: impl Into<PathBuf>) -> Self {
        self.source(SourceDescriptor::file(path))
    }

    /// Load from in-memory text; `path` selects the parser and names the dataset.
    pub fn contents(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.source(SourceDescriptor::contents(path, contents))
    }

    /// Use an already parsed dataset.
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Override the dataset name reported by the parser.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_missing_handler(mut self, handler: impl MissingValueHandler + 'static) -> Self {
        self.missing_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Some(Arc::new(normalizer));
        self
    }

    pub fn with_outlier_detector(mut self, detector: impl OutlierDetector + 'static) -> Self {
        self.outlier_detector = Some(Arc::new(detector));
        self
    }

    /// Parse the source (if any) and apply inferred types.
    pub fn build(self) -> Result<DataContainer> {
        let (raw, parser, source) = match (self.source, self.dataset) {
            (Some(source), None) => {
                let parser = assign_parser(&source, &self.config.parser)?;
                let raw = parser.parse()?;
                info!(
                    source = %source.path.display(),
                    rows = raw.row_count(),
                    columns = raw.column_count(),
                    "loaded dataset"
                );
                (raw, Some(parser), Some(source))
            }
            (None, Some(dataset)) => (dataset, None, None),
            (None, None) => {
                return Err(WashError::Construction(
                    "either a source or a dataset is required".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(WashError::Construction(
                    "supply a source or a dataset, not both".to_string(),
                ));
            }
        };

        let rng = match self.config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let outlier_detector = self.outlier_detector.unwrap_or_else(|| {
            Arc::new(match self.config.seed {
                Some(seed) => EnsembleDetector::with_seed(seed),
                None => EnsembleDetector::new(),
            })
        });
        let name = self
            .name
            .or_else(|| parser.as_ref().map(|p| p.name().to_string()));

        let mut container = DataContainer {
            dataset: Dataset::empty(),
            source,
            parser,
            name,
            score: None,
            inferencer: TypeInferencer::with_config(self.config.inference.clone()),
            rng,
            config: self.config,
            missing_handler: self.missing_handler.unwrap_or_else(|| Arc::new(Imputer)),
            normalizer: self.normalizer.unwrap_or_else(|| Arc::new(Scaler)),
            outlier_detector,
        };
        container.set_dataset(raw);
        Ok(container)
    }
}

/// Owns one dataset snapshot and runs every cleaning step against it.
///
/// Each mutating operation builds a new snapshot and swaps it in only when
/// the step succeeds, so a failed step leaves the data untouched.
pub struct DataContainer {
    dataset: Dataset,
    source: Option<SourceDescriptor>,
    parser: Option<Box<dyn ParserHandle>>,
    name: Option<String>,
    score: Option<DataScore>,
    inferencer: TypeInferencer,
    rng: fastrand::Rng,
    config: ContainerConfig,
    missing_handler: Arc<dyn MissingValueHandler>,
    normalizer: Arc<dyn Normalizer>,
    outlier_detector: Arc<dyn OutlierDetector>,
}

impl DataContainer {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Load a file with default configuration.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().path(path).build()
    }

    /// Wrap an already parsed dataset.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        Self::builder().dataset(dataset).build()
    }

    /// Replace the dataset, inferring and applying column types.
    ///
    /// When the inferred types do not apply cleanly the dataset is kept with
    /// its parsed types.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let inferred = self.inferencer.discover_types(&dataset, &mut self.rng);
        let requested: IndexMap<String, SemanticType> = dataset
            .column_names()
            .into_iter()
            .map(String::from)
            .zip(inferred)
            .collect();
        self.dataset = match dataset.with_dtypes(&requested) {
            Ok(typed) => typed,
            Err(e) => {
                warn!(error = %e, "inferred types could not be applied, keeping parsed types");
                dataset
            }
        };
    }

    /// The current snapshot.
    pub fn get_dataframe(&self) -> &Dataset {
        &self.dataset
    }

    pub fn get_dtypes(&self) -> IndexMap<String, SemanticType> {
        self.dataset.dtypes()
    }

    /// Convert columns to the requested types, all or nothing.
    ///
    /// On failure a warning is logged, the snapshot is unchanged and the
    /// error is returned for callers that want it.
    pub fn update_dtypes(&mut self, requested: &IndexMap<String, SemanticType>) -> Result<()> {
        match self.dataset.with_dtypes(requested) {
            Ok(typed) => {
                debug!(columns = requested.len(), "updated dtypes");
                self.dataset = typed;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed updating dtypes");
                Err(e)
            }
        }
    }

    /// Drop rows by label. Returns how many rows were removed.
    pub fn remove(&mut self, labels: &BTreeSet<usize>) -> Result<usize> {
        let remaining = self.dataset.drop_rows(labels)?;
        let removed = self.dataset.row_count() - remaining.row_count();
        debug!(removed, "removed rows");
        self.dataset = remaining;
        Ok(removed)
    }

    /// Repair missing values; cells rendering to one of `markers` count as missing.
    pub fn missing(&mut self, strategy: MissingStrategy, markers: &[String]) -> Result<&Dataset> {
        let repaired = self
            .missing_handler
            .handle_missing(&self.dataset, strategy, markers)?;
        debug!(
            strategy = %strategy,
            before = self.dataset.missing_count(),
            after = repaired.missing_count(),
            "handled missing values"
        );
        self.dataset = repaired;
        Ok(&self.dataset)
    }

    /// Rescale the given numeric columns.
    pub fn scale(
        &mut self,
        columns: &[String],
        strategy: NormalizeStrategy,
        range: ScaleRange,
    ) -> Result<&Dataset> {
        self.dataset = self
            .normalizer
            .normalize(&self.dataset, columns, strategy, range)?;
        Ok(&self.dataset)
    }

    /// Rank rows by outlier score using the algorithms at the given
    /// catalogue positions. The stored snapshot is not modified.
    pub fn outlier(&self, selection: &[usize], contamination: f64) -> Result<OutlierReport> {
        let missing = self.dataset.missing_count();
        if missing > 0 {
            return Err(WashError::MissingData { count: missing });
        }
        let algorithms = OutlierAlgorithm::resolve(selection)?;
        let columns: Vec<String> = self
            .dataset
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        self.outlier_detector
            .identify_outliers(&self.dataset, &columns, contamination, &algorithms)
    }

    /// Propose a contamination fraction for the current snapshot.
    pub fn contamination(&self) -> Result<f64> {
        self.outlier_detector.estimate_contamination(&self.dataset)
    }

    /// Serialize the snapshot.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => export_csv(&self.dataset),
            ExportFormat::Arff => {
                let (attributes, description) = match &self.parser {
                    Some(parser) => (parser.attributes(), parser.description()),
                    None => (&[][..], ""),
                };
                export_arff(
                    self.name.as_deref().unwrap_or("dataset"),
                    &self.dataset,
                    attributes,
                    description,
                )
            }
        }
    }

    /// Serialize the snapshot to a format given by name (`csv`, `arff`).
    pub fn export_as(&self, format: &str) -> Result<String> {
        self.export(format.parse()?)
    }

    /// The first rows of the snapshot.
    pub fn preview(&self) -> Dataset {
        self.dataset.head(self.config.preview_rows)
    }

    /// Score the snapshot and cache the result.
    pub fn analyze(&mut self) -> &DataScore {
        let score = DataScore::compute(&self.dataset);
        debug!(score = score.score, band = %score.band, "analyzed dataset");
        self.score.insert(score)
    }

    /// The last score from [`analyze`](Self::analyze), if any.
    pub fn get_datascore(&self) -> Option<&DataScore> {
        self.score.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn source(&self) -> Option<&SourceDescriptor> {
        self.source.as_ref()
    }

    /// Metadata reported by the parser, when loaded from a source.
    pub fn metadata(&self) -> Option<&SourceMetadata> {
        self.parser.as_ref().map(|p| p.metadata())
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }
}

impl fmt::Display for DataContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match (&self.source, &self.name) {
            (Some(source), _) => source.path.display().to_string(),
            (None, Some(name)) => name.clone(),
            (None, None) => "<dataset>".to_string(),
        };
        let (rows, cols) = self.dataset.shape();
        write!(f, "{} ({}, {})", label, rows, cols)
    }
}
