//! Error taxonomy for the extraction pipeline.
//!
//! Extraction and curation errors are recoverable for the run: the driver
//! records a per-artifact failure and continues. Aggregation errors are
//! fatal, since an empty catalog has no meaningful output.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::ArtifactType;

/// Raw extractor output is insufficient for the declared artifact type, or
/// the artifact bytes cannot be read.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{artifact_type} artifact is missing required field `{field}`")]
    MissingField {
        artifact_type: ArtifactType,
        field: &'static str,
    },
    #[error("{artifact_type} artifact field `{field}` is malformed: {detail}")]
    InvalidField {
        artifact_type: ArtifactType,
        field: &'static str,
        detail: String,
    },
    #[error("field `{field}` is not a valid extent: min exceeds max")]
    InvalidExtent { field: &'static str },
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A complete record cannot be curated.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("curation is defined only for point_cloud artifacts, got {0}")]
    NotPointCloud(ArtifactType),
}

/// The record set handed to the aggregator is unusable as a whole.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("cannot aggregate an empty artifact record set")]
    EmptyInput,
}
