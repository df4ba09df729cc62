//! Complete-metadata assembly.
//!
//! `assemble` normalizes a raw extractor's output plus identity fields into
//! the complete record for one artifact. It validates the minimum field
//! contract for the declared type and copies everything else verbatim; it
//! never interprets semantics. The only side effect is a read-only pass over
//! the artifact bytes for hashing.

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ExtractionError;
use crate::extent::Extent;
use crate::schema::{
    ArtifactRecord, ArtifactType, CompleteRecord, FreeformAttributes, PointCloudAttributes,
    QualityMetrics, RawAttributes, TrajectoryAttributes,
};

/// Raw attribute mapping as produced by an upstream extractor, in extractor
/// order.
pub type RawAttributeMap = IndexMap<String, Value>;

/// Builds the complete record for one artifact. `curated` is left empty;
/// the driver fills it in for artifact types with curation rules.
pub fn assemble(
    artifact_path: &Path,
    artifact_type: ArtifactType,
    raw_attributes: RawAttributeMap,
) -> Result<ArtifactRecord, ExtractionError> {
    let bytes = fs::read(artifact_path).map_err(|source| ExtractionError::Io {
        path: artifact_path.to_path_buf(),
        source,
    })?;
    let content_hash = sha256_hex(&bytes);
    let extracted_at = Utc::now();

    let attributes = typed_attributes(artifact_type, raw_attributes)?;

    Ok(ArtifactRecord {
        artifact_id: format!("{}#{}", artifact_path.display(), content_hash),
        artifact_type,
        extracted_at,
        complete: CompleteRecord {
            source_path: artifact_path.to_path_buf(),
            file_size_bytes: bytes.len() as u64,
            content_hash,
            extracted_at,
            attributes,
        },
        curated: None,
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Validates the minimum field contract for `artifact_type` and moves the
/// remaining raw fields into the verbatim `extra` map unchanged.
fn typed_attributes(
    artifact_type: ArtifactType,
    mut raw: RawAttributeMap,
) -> Result<RawAttributes, ExtractionError> {
    match artifact_type {
        ArtifactType::PointCloud => {
            let point_count = take_u64(&mut raw, artifact_type, "point_count")?;
            let bbox = take_extent(&mut raw, artifact_type, "bbox")?;
            let classification_histogram =
                take_histogram(&mut raw, artifact_type, "classification_histogram")?;
            let return_number_histogram =
                take_histogram(&mut raw, artifact_type, "return_number_histogram")?;
            Ok(RawAttributes::PointCloud(PointCloudAttributes {
                point_count,
                bbox,
                classification_histogram,
                return_number_histogram,
                extra: raw,
            }))
        }
        ArtifactType::GpsTrajectory => {
            let distance_km = take_f64(&mut raw, artifact_type, "distance_km")?;
            let duration_hours = take_f64(&mut raw, artifact_type, "duration_hours")?;
            let coverage_extent = take_extent(&mut raw, artifact_type, "coverage_extent")?;
            let quality_metrics = take_quality_metrics(&mut raw, artifact_type)?;
            Ok(RawAttributes::GpsTrajectory(TrajectoryAttributes {
                distance_km,
                duration_hours,
                coverage_extent,
                quality_metrics,
                extra: raw,
            }))
        }
        ArtifactType::ProcessingResult => Ok(RawAttributes::ProcessingResult(FreeformAttributes {
            fields: raw,
        })),
        ArtifactType::Config => Ok(RawAttributes::Config(FreeformAttributes { fields: raw })),
        ArtifactType::Log => Ok(RawAttributes::Log(FreeformAttributes { fields: raw })),
    }
}

fn take_field(
    raw: &mut RawAttributeMap,
    artifact_type: ArtifactType,
    field: &'static str,
) -> Result<Value, ExtractionError> {
    raw.shift_remove(field)
        .ok_or(ExtractionError::MissingField {
            artifact_type,
            field,
        })
}

fn take_u64(
    raw: &mut RawAttributeMap,
    artifact_type: ArtifactType,
    field: &'static str,
) -> Result<u64, ExtractionError> {
    let value = take_field(raw, artifact_type, field)?;
    value.as_u64().ok_or_else(|| ExtractionError::InvalidField {
        artifact_type,
        field,
        detail: format!("expected a non-negative integer, got {value}"),
    })
}

fn take_f64(
    raw: &mut RawAttributeMap,
    artifact_type: ArtifactType,
    field: &'static str,
) -> Result<f64, ExtractionError> {
    let value = take_field(raw, artifact_type, field)?;
    value.as_f64().ok_or_else(|| ExtractionError::InvalidField {
        artifact_type,
        field,
        detail: format!("expected a number, got {value}"),
    })
}

fn take_extent(
    raw: &mut RawAttributeMap,
    artifact_type: ArtifactType,
    field: &'static str,
) -> Result<Extent, ExtractionError> {
    let value = take_field(raw, artifact_type, field)?;
    let minx = member_f64(&value, artifact_type, field, "minx")?;
    let miny = member_f64(&value, artifact_type, field, "miny")?;
    let maxx = member_f64(&value, artifact_type, field, "maxx")?;
    let maxy = member_f64(&value, artifact_type, field, "maxy")?;
    Extent::checked(minx, miny, maxx, maxy).ok_or(ExtractionError::InvalidExtent { field })
}

fn take_quality_metrics(
    raw: &mut RawAttributeMap,
    artifact_type: ArtifactType,
) -> Result<QualityMetrics, ExtractionError> {
    let field = "quality_metrics";
    let value = take_field(raw, artifact_type, field)?;
    Ok(QualityMetrics {
        pdop_average: member_f64(&value, artifact_type, field, "pdop_average")?,
        satellite_count_average: member_f64(&value, artifact_type, field, "satellite_count_average")?,
        position_accuracy_cm: member_f64(&value, artifact_type, field, "position_accuracy_cm")?,
    })
}

fn member_f64(
    value: &Value,
    artifact_type: ArtifactType,
    field: &'static str,
    member: &str,
) -> Result<f64, ExtractionError> {
    value
        .get(member)
        .and_then(Value::as_f64)
        .ok_or_else(|| ExtractionError::InvalidField {
            artifact_type,
            field,
            detail: format!("missing or non-numeric `{member}`"),
        })
}

fn take_histogram(
    raw: &mut RawAttributeMap,
    artifact_type: ArtifactType,
    field: &'static str,
) -> Result<BTreeMap<u8, u64>, ExtractionError> {
    let value = take_field(raw, artifact_type, field)?;
    let object = value
        .as_object()
        .ok_or_else(|| ExtractionError::InvalidField {
            artifact_type,
            field,
            detail: "expected a code -> count mapping".to_string(),
        })?;
    let mut histogram = BTreeMap::new();
    for (key, count) in object {
        let code: u8 = key.parse().map_err(|_| ExtractionError::InvalidField {
            artifact_type,
            field,
            detail: format!("histogram key `{key}` is not an 8-bit code"),
        })?;
        let count = count
            .as_u64()
            .ok_or_else(|| ExtractionError::InvalidField {
                artifact_type,
                field,
                detail: format!("count for code {code} is not a non-negative integer"),
            })?;
        histogram.insert(code, count);
    }
    Ok(histogram)
}
