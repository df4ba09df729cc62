//! Schema types for artifact records, curated records, and survey catalogs.
//!
//! Records are immutable value objects once assembled: re-running the
//! pipeline produces new records rather than patching old ones. Everything
//! here serializes losslessly to both JSON and YAML with identical field
//! names, and insertion-ordered maps stay in extractor order on the wire.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::extent::Extent;

/// Catalog schema version stamped into `catalog_info`.
pub const CATALOG_VERSION: &str = "1.0.0";

/// Supported input artifact types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    PointCloud,
    GpsTrajectory,
    ProcessingResult,
    Config,
    Log,
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactType::PointCloud => "point_cloud",
            ArtifactType::GpsTrajectory => "gps_trajectory",
            ArtifactType::ProcessingResult => "processing_result",
            ArtifactType::Config => "config",
            ArtifactType::Log => "log",
        };
        f.write_str(name)
    }
}

/// One record per ingested file. `curated` is present only for artifact
/// types that define curation rules (currently point clouds) and is omitted
/// from serialization otherwise, so absence stays distinguishable from null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Source path plus content hash; stable across runs on unchanged files.
    pub artifact_id: String,
    pub artifact_type: ArtifactType,
    pub extracted_at: DateTime<Utc>,
    pub complete: CompleteRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curated: Option<CuratedRecord>,
}

/// Exhaustive, format-faithful metadata for one artifact: fixed identity
/// fields plus everything the raw extractor produced, verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRecord {
    pub source_path: PathBuf,
    pub file_size_bytes: u64,
    /// SHA-256 over the artifact bytes. Change-detection key, not a
    /// security primitive.
    pub content_hash: String,
    pub extracted_at: DateTime<Utc>,
    pub attributes: RawAttributes,
}

/// Per-type attribute shapes. Explicit shapes (rather than open mappings)
/// mean missing-field errors surface at assembly instead of deep inside
/// curation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "artifact_type", rename_all = "snake_case")]
pub enum RawAttributes {
    PointCloud(PointCloudAttributes),
    GpsTrajectory(TrajectoryAttributes),
    ProcessingResult(FreeformAttributes),
    Config(FreeformAttributes),
    Log(FreeformAttributes),
}

impl RawAttributes {
    pub fn artifact_type(&self) -> ArtifactType {
        match self {
            RawAttributes::PointCloud(_) => ArtifactType::PointCloud,
            RawAttributes::GpsTrajectory(_) => ArtifactType::GpsTrajectory,
            RawAttributes::ProcessingResult(_) => ArtifactType::ProcessingResult,
            RawAttributes::Config(_) => ArtifactType::Config,
            RawAttributes::Log(_) => ArtifactType::Log,
        }
    }
}

/// Point-cloud header and point-statistics fields. Histogram keys are the
/// ASPRS classification codes / return numbers reported by the reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloudAttributes {
    pub point_count: u64,
    pub bbox: Extent,
    pub classification_histogram: BTreeMap<u8, u64>,
    pub return_number_histogram: BTreeMap<u8, u64>,
    /// Every other extractor field, untouched and in extractor order.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// GPS trajectory fields from the POSPac / SBET readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryAttributes {
    pub distance_km: f64,
    pub duration_hours: f64,
    pub coverage_extent: Extent,
    pub quality_metrics: QualityMetrics,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub pdop_average: f64,
    pub satellite_count_average: f64,
    pub position_accuracy_cm: f64,
}

/// Free-form mapping carried verbatim for processing results, configuration
/// snapshots, and logs. Order is preserved so the survey rollup's
/// last-writer-wins merge is reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreeformAttributes {
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

/// Business-actionable projection of a point-cloud complete record. A pure
/// function of that record: nothing here depends on other artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedRecord {
    pub point_count: u64,
    pub bbox: Extent,
    /// `point_count / planar_area(bbox)`; zero (never an error) when the
    /// extent is degenerate.
    pub point_density_per_unit2: f64,
    pub ml_features: MlFeatures,
    pub processing_estimates: ProcessingEstimates,
}

/// Content flags for ML-training selection, in feature-table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlFeatures {
    #[serde(flatten)]
    pub flags: IndexMap<String, bool>,
    pub point_density_category: DensityCategory,
    pub classification_diversity: u64,
    pub return_complexity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityCategory {
    Low,
    Medium,
    High,
}

impl DensityCategory {
    /// Ordinal used by the priority score: low < medium < high.
    pub fn rank(self) -> u64 {
        match self {
            DensityCategory::Low => 0,
            DensityCategory::Medium => 1,
            DensityCategory::High => 2,
        }
    }
}

/// Orchestration hints derived from the point count and detected content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingEstimates {
    pub estimated_processing_time_seconds: u64,
    pub memory_requirements_mb: u64,
    pub suitable_for_batch: bool,
    /// Heuristic ranking in [0.1, 1.0]; monotonic in detected features and
    /// density category.
    pub priority_score: f64,
}

/// Survey-level catalog folded from every successfully extracted record of
/// one collection campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyCatalog {
    pub catalog_info: CatalogInfo,
    /// Union of all point-cloud and trajectory extents. Omitted when the
    /// survey carries no spatial artifact at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_extent: Option<Extent>,
    pub point_cloud_records: Vec<ArtifactRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_summary: Option<TrajectorySummary>,
    /// Rollup of processing_result and config artifacts in input order;
    /// later artifacts win on key collision.
    pub processing_chain: IndexMap<String, Value>,
    pub artifact_count_by_type: BTreeMap<ArtifactType, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub total_files: u64,
    pub total_points: u64,
    pub total_size_bytes: u64,
}

/// Survey-wide trajectory rollup, present iff at least one gps_trajectory
/// artifact was extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub trajectory_count: u64,
    /// Plain sum across trajectory records. Overlapping trajectories count
    /// twice; overlap detection is out of scope.
    pub total_distance_km: f64,
    pub flight_duration_hours: f64,
    /// Unweighted arithmetic means across records, not weighted by flight
    /// duration. Known simplification.
    pub quality_metrics: QualityMetrics,
}

/// Per-run summary of what was extracted and what was skipped. A failed
/// artifact never disappears silently: its reason is recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub processed: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub artifacts: Vec<ArtifactStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactStatus {
    pub source_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<ArtifactType>,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Failed,
}

/// Standalone curated entry written to the `curated_metadata` output so
/// downstream consumers can feed curated records without loading the
/// complete tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedEntry {
    pub artifact_id: String,
    pub source_path: PathBuf,
    pub curated: CuratedRecord,
}
