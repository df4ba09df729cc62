//! Dual-tier metadata curation and survey aggregation for geospatial
//! survey datasets.
//!
//! The pipeline assembles a verbose "complete" record per ingested
//! artifact, derives a compact "curated" record for point clouds, and folds
//! everything from one survey into a single catalog for downstream
//! orchestration and ML-training pipelines.

pub mod aggregate;
pub mod assemble;
pub mod curate;
pub mod error;
pub mod extent;
pub mod output;
pub mod run;
pub mod schema;

pub use aggregate::aggregate;
pub use assemble::assemble;
pub use curate::{curate, CurationConfig};
pub use error::{AggregationError, CurationError, ExtractionError};
pub use extent::Extent;
pub use output::OutputFormat;
pub use run::{run, RunOptions, RunOutcome};
pub use schema::{ArtifactRecord, ArtifactType, CuratedRecord, SurveyCatalog};
