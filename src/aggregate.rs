//! Survey aggregation: folds per-artifact records into one survey catalog.
//!
//! A pure fold over immutable input. The only ordering-sensitive part is the
//! processing-chain rollup (last writer wins), so callers hand records over
//! in a stable order — the driver sorts by source path.

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::AggregationError;
use crate::extent::{union_all, Extent};
use crate::schema::{
    ArtifactRecord, ArtifactType, CatalogInfo, QualityMetrics, RawAttributes, SurveyCatalog,
    TrajectoryAttributes, TrajectorySummary, CATALOG_VERSION,
};

/// Folds an ordered, non-empty sequence of records into a survey catalog.
pub fn aggregate(records: &[ArtifactRecord]) -> Result<SurveyCatalog, AggregationError> {
    if records.is_empty() {
        return Err(AggregationError::EmptyInput);
    }

    let mut extents: Vec<Extent> = Vec::new();
    let mut trajectories: Vec<&TrajectoryAttributes> = Vec::new();
    let mut processing_chain: IndexMap<String, Value> = IndexMap::new();
    let mut artifact_count_by_type: BTreeMap<ArtifactType, u64> = BTreeMap::new();
    let mut point_cloud_records: Vec<ArtifactRecord> = Vec::new();
    let mut total_points = 0u64;
    let mut total_size_bytes = 0u64;

    for record in records {
        *artifact_count_by_type
            .entry(record.artifact_type)
            .or_insert(0) += 1;
        total_size_bytes += record.complete.file_size_bytes;

        match &record.complete.attributes {
            RawAttributes::PointCloud(attributes) => {
                extents.push(attributes.bbox);
                total_points += attributes.point_count;
                point_cloud_records.push(record.clone());
            }
            RawAttributes::GpsTrajectory(attributes) => {
                extents.push(attributes.coverage_extent);
                trajectories.push(attributes);
            }
            RawAttributes::ProcessingResult(freeform) | RawAttributes::Config(freeform) => {
                // Last writer wins on key collision; this decides which
                // equipment/software string survives when sources disagree.
                for (key, value) in &freeform.fields {
                    processing_chain.insert(key.clone(), value.clone());
                }
            }
            RawAttributes::Log(_) => {}
        }
    }

    Ok(SurveyCatalog {
        catalog_info: CatalogInfo {
            version: CATALOG_VERSION.to_string(),
            generated_at: Utc::now(),
            total_files: records.len() as u64,
            total_points,
            total_size_bytes,
        },
        survey_extent: union_all(extents.iter()),
        point_cloud_records,
        trajectory_summary: trajectory_summary(&trajectories),
        processing_chain,
        artifact_count_by_type,
    })
}

/// `None` when the survey has no trajectory artifact; absence must stay
/// distinguishable from a zero-valued summary.
fn trajectory_summary(trajectories: &[&TrajectoryAttributes]) -> Option<TrajectorySummary> {
    if trajectories.is_empty() {
        return None;
    }
    let count = trajectories.len() as f64;
    Some(TrajectorySummary {
        trajectory_count: trajectories.len() as u64,
        total_distance_km: trajectories.iter().map(|t| t.distance_km).sum(),
        flight_duration_hours: trajectories.iter().map(|t| t.duration_hours).sum(),
        quality_metrics: QualityMetrics {
            pdop_average: trajectories
                .iter()
                .map(|t| t.quality_metrics.pdop_average)
                .sum::<f64>()
                / count,
            satellite_count_average: trajectories
                .iter()
                .map(|t| t.quality_metrics.satellite_count_average)
                .sum::<f64>()
                / count,
            position_accuracy_cm: trajectories
                .iter()
                .map(|t| t.quality_metrics.position_accuracy_cm)
                .sum::<f64>()
                / count,
        },
    })
}
