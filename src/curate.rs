//! Curation engine: derives the business-actionable record from a
//! point-cloud complete record.
//!
//! Curation is a pure, total function of the complete record. Legitimately
//! empty data (zero points, degenerate extents) curates to zeros and the
//! floor priority score rather than failing; errors are reserved for records
//! that structurally cannot be curated.

use indexmap::IndexMap;

use crate::error::CurationError;
use crate::schema::{
    CompleteRecord, CuratedRecord, DensityCategory, MlFeatures, PointCloudAttributes,
    ProcessingEstimates, RawAttributes,
};

/// ASPRS classification code sets behind each ML feature flag. A flag is
/// true iff at least one point carries one of its codes; there is no
/// minimum-count threshold. New features are added here, not in code paths.
pub const FEATURE_CLASSES: &[(&str, &[u8])] = &[
    ("has_ground_points", &[2]),
    ("has_buildings", &[6]),
    ("has_vegetation", &[3, 4, 5]),
    ("has_water", &[9]),
    ("has_bridges", &[17]),
    ("has_noise", &[7]),
];

/// Tunable curation thresholds. The defaults are documented constants so
/// behavior is reproducible without external configuration.
#[derive(Debug, Clone)]
pub struct CurationConfig {
    /// T1: density at or above this is at least `medium` (points/unit2).
    pub density_medium_threshold: f64,
    /// T2: density at or above this is `high` (points/unit2).
    pub density_high_threshold: f64,
    /// Fixed throughput assumption for processing-time estimates.
    pub processing_rate_points_per_second: u64,
    /// Working-set assumption for memory estimates.
    pub bytes_per_point: u64,
    /// Point counts below this are suitable for batch processing.
    pub batch_point_threshold: u64,
}

pub const DEFAULT_DENSITY_MEDIUM_THRESHOLD: f64 = 1.0;
pub const DEFAULT_DENSITY_HIGH_THRESHOLD: f64 = 5.0;
pub const DEFAULT_PROCESSING_RATE_POINTS_PER_SECOND: u64 = 100_000;
pub const DEFAULT_BYTES_PER_POINT: u64 = 100;
pub const DEFAULT_BATCH_POINT_THRESHOLD: u64 = 5_000_000;

impl Default for CurationConfig {
    fn default() -> Self {
        CurationConfig {
            density_medium_threshold: DEFAULT_DENSITY_MEDIUM_THRESHOLD,
            density_high_threshold: DEFAULT_DENSITY_HIGH_THRESHOLD,
            processing_rate_points_per_second: DEFAULT_PROCESSING_RATE_POINTS_PER_SECOND,
            bytes_per_point: DEFAULT_BYTES_PER_POINT,
            batch_point_threshold: DEFAULT_BATCH_POINT_THRESHOLD,
        }
    }
}

/// Curates a complete record. Defined only for point clouds; every other
/// artifact type passes through to the survey rollup uncurated.
pub fn curate(
    complete: &CompleteRecord,
    config: &CurationConfig,
) -> Result<CuratedRecord, CurationError> {
    match &complete.attributes {
        RawAttributes::PointCloud(attributes) => Ok(curate_point_cloud(attributes, config)),
        other => Err(CurationError::NotPointCloud(other.artifact_type())),
    }
}

fn curate_point_cloud(
    attributes: &PointCloudAttributes,
    config: &CurationConfig,
) -> CuratedRecord {
    let area = attributes.bbox.planar_area();
    let point_density_per_unit2 = if area > 0.0 {
        attributes.point_count as f64 / area
    } else {
        // Degenerate or zero-extent files are valid, just sparse.
        0.0
    };

    let mut flags = IndexMap::with_capacity(FEATURE_CLASSES.len());
    for (name, codes) in FEATURE_CLASSES {
        let detected = codes.iter().any(|code| {
            attributes
                .classification_histogram
                .get(code)
                .is_some_and(|&count| count > 0)
        });
        flags.insert((*name).to_string(), detected);
    }
    let detected_features = flags.values().filter(|&&detected| detected).count() as u64;

    let classification_diversity = attributes
        .classification_histogram
        .values()
        .filter(|&&count| count > 0)
        .count() as u64;

    // Distinct return numbers past the first, a coarse vegetation-structure
    // proxy: only multi-return pulses produce them.
    let return_complexity = attributes
        .return_number_histogram
        .iter()
        .filter(|&(&return_number, &count)| return_number >= 2 && count > 0)
        .count() as u64;

    let point_density_category = density_category(point_density_per_unit2, config);

    let processing_estimates = ProcessingEstimates {
        estimated_processing_time_seconds: attributes
            .point_count
            .div_ceil(config.processing_rate_points_per_second),
        memory_requirements_mb: (attributes.point_count * config.bytes_per_point)
            .div_ceil(1_000_000),
        suitable_for_batch: attributes.point_count < config.batch_point_threshold,
        priority_score: priority_score(
            detected_features,
            point_density_category,
            classification_diversity,
        ),
    };

    CuratedRecord {
        point_count: attributes.point_count,
        bbox: attributes.bbox,
        point_density_per_unit2,
        ml_features: MlFeatures {
            flags,
            point_density_category,
            classification_diversity,
            return_complexity,
        },
        processing_estimates,
    }
}

fn density_category(density: f64, config: &CurationConfig) -> DensityCategory {
    if density >= config.density_high_threshold {
        DensityCategory::High
    } else if density >= config.density_medium_threshold {
        DensityCategory::Medium
    } else {
        DensityCategory::Low
    }
}

/// Weighted sum in [0.1, 1.0]: a 0.1 floor, 0.1 per detected feature flag,
/// 0.1 per density rank, and a 0.1 bonus for diverse classification.
/// Monotonic in detected features and density category by construction.
fn priority_score(detected_features: u64, category: DensityCategory, diversity: u64) -> f64 {
    let diversity_bonus = u64::from(diversity > 5);
    let units = 1 + detected_features + category.rank() + diversity_bonus;
    (units as f64 * 0.1).clamp(0.1, 1.0)
}
