//! Shared test infrastructure for integration tests.

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use survey_sidecar::curate::CurationConfig;
use survey_sidecar::output::OutputFormat;
use survey_sidecar::run::RunOptions;

/// A temporary survey directory: artifact bytes plus their `.raw.json`
/// extractor sidecars, with an output directory alongside.
pub struct SurveyFixture {
    _dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for SurveyFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp survey dir");
        let input_dir = dir.path().join("data");
        let output_dir = dir.path().join("output");
        fs::create_dir_all(&input_dir).expect("create input dir");
        Self {
            _dir: dir,
            input_dir,
            output_dir,
        }
    }

    /// Writes artifact bytes and a matching sidecar declaring `artifact_type`
    /// with `attributes`. Returns the artifact path.
    pub fn add_artifact(
        &self,
        name: &str,
        bytes: &[u8],
        artifact_type: &str,
        attributes: Value,
    ) -> PathBuf {
        let artifact = self.input_dir.join(name);
        fs::write(&artifact, bytes).expect("write artifact bytes");
        let sidecar = json!({
            "artifact_type": artifact_type,
            "attributes": attributes,
        });
        self.write_sidecar(name, &serde_json::to_string_pretty(&sidecar).unwrap());
        artifact
    }

    /// Writes a sidecar with arbitrary (possibly malformed) contents and no
    /// artifact bytes next to it.
    pub fn write_sidecar(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.input_dir.join(format!("{name}.raw.json"));
        fs::write(&path, contents).expect("write sidecar");
        path
    }

    pub fn options(&self, build_catalog: bool) -> RunOptions {
        RunOptions {
            input_dir: self.input_dir.clone(),
            files: Vec::new(),
            output_dir: self.output_dir.clone(),
            format: OutputFormat::Both,
            build_catalog,
            curation: CurationConfig::default(),
        }
    }

    /// Parses a `_latest.json` output by stem.
    pub fn latest_json(&self, stem: &str) -> Value {
        let path = self.output_dir.join(format!("{stem}_latest.json"));
        let text = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
        serde_json::from_str(&text).expect("parse latest output")
    }
}

/// Raw point-cloud attributes for a square tile with ground and water.
pub fn urban_tile_attributes(point_count: u64) -> Value {
    json!({
        "point_count": point_count,
        "bbox": {"minx": 0.0, "miny": 0.0, "maxx": 100.0, "maxy": 100.0},
        "classification_histogram": {"2": point_count * 6 / 10, "9": point_count * 4 / 10},
        "return_number_histogram": {"1": point_count},
        "generating_software": "TerraScan",
    })
}

pub fn trajectory_attributes(distance_km: f64, pdop: f64) -> Value {
    json!({
        "distance_km": distance_km,
        "duration_hours": 1.5,
        "coverage_extent": {"minx": -20.0, "miny": -10.0, "maxx": 120.0, "maxy": 90.0},
        "quality_metrics": {
            "pdop_average": pdop,
            "satellite_count_average": 11.0,
            "position_accuracy_cm": 2.5,
        },
    })
}
