//! End-to-end run over a mixed survey directory.

mod common;

use common::{trajectory_attributes, urban_tile_attributes, SurveyFixture};
use serde_json::json;
use survey_sidecar::run::run;
use survey_sidecar::schema::{ArtifactType, RunStatus};

fn mixed_survey() -> SurveyFixture {
    let fixture = SurveyFixture::new();
    fixture.add_artifact(
        "tile_001.laz",
        b"fake LAS bytes for tile 001",
        "point_cloud",
        urban_tile_attributes(1_000_000),
    );
    fixture.add_artifact(
        "flight_a.gps",
        b"fake trajectory bytes",
        "gps_trajectory",
        trajectory_attributes(42.0, 1.6),
    );
    fixture.add_artifact(
        "session_old.cfg",
        b"[gps]\n",
        "config",
        json!({"gps_processing": "POSPac 8.3", "base_station": "REF1"}),
    );
    fixture.add_artifact(
        "session_new.cfg",
        b"[gps]\n",
        "config",
        json!({"gps_processing": "POSPac 8.4"}),
    );
    // Corrupt sidecar: parse failure must skip this artifact, not the run.
    fixture.write_sidecar("broken.laz", "{ not json");
    fixture
}

#[test]
fn catalog_run_processes_everything_and_isolates_failures() {
    let fixture = mixed_survey();
    let outcome = run(&fixture.options(true)).unwrap();

    assert_eq!(outcome.report.processed, 5);
    assert_eq!(outcome.report.succeeded, 4);
    assert_eq!(outcome.report.skipped, 1);

    let failed: Vec<_> = outcome
        .report
        .artifacts
        .iter()
        .filter(|a| a.status == RunStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].source_path.ends_with("broken.laz"));
    assert!(failed[0].reason.as_deref().unwrap().contains("parse"));

    let catalog = outcome.catalog.unwrap();
    assert_eq!(catalog.catalog_info.total_files, 4);
    assert_eq!(catalog.catalog_info.total_points, 1_000_000);
    assert_eq!(catalog.artifact_count_by_type[&ArtifactType::Config], 2);

    // Sorted path order: session_new.cfg merges before session_old.cfg, so
    // the old value wins the collision here.
    assert_eq!(
        catalog.processing_chain["gps_processing"],
        json!("POSPac 8.3")
    );
    assert_eq!(catalog.processing_chain["base_station"], json!("REF1"));

    // Union of the tile bbox and the trajectory coverage.
    let extent = catalog.survey_extent.unwrap();
    assert_eq!(extent.minx, -20.0);
    assert_eq!(extent.miny, -10.0);
    assert_eq!(extent.maxx, 120.0);
    assert_eq!(extent.maxy, 100.0);

    let summary = catalog.trajectory_summary.unwrap();
    assert_eq!(summary.trajectory_count, 1);
    assert_eq!(summary.total_distance_km, 42.0);
}

#[test]
fn point_clouds_get_curated_records() {
    let fixture = mixed_survey();
    let outcome = run(&fixture.options(false)).unwrap();
    assert!(outcome.catalog.is_none());

    let tile = outcome
        .records
        .iter()
        .find(|r| r.artifact_type == ArtifactType::PointCloud)
        .unwrap();
    let curated = tile.curated.as_ref().unwrap();
    assert_eq!(curated.point_count, 1_000_000);
    // 1M points over 100x100 units.
    assert_eq!(curated.point_density_per_unit2, 100.0);
    assert!(curated.ml_features.flags["has_ground_points"]);
    assert!(curated.ml_features.flags["has_water"]);
    assert!(!curated.ml_features.flags["has_buildings"]);
    assert_eq!(curated.processing_estimates.estimated_processing_time_seconds, 10);
    assert_eq!(curated.processing_estimates.memory_requirements_mb, 100);

    // Non-point-clouds never carry a curated tier.
    for record in &outcome.records {
        if record.artifact_type != ArtifactType::PointCloud {
            assert!(record.curated.is_none());
        }
    }
}

#[test]
fn outputs_land_as_timestamped_and_latest_pairs() {
    let fixture = mixed_survey();
    run(&fixture.options(true)).unwrap();

    for stem in [
        "complete_metadata",
        "curated_metadata",
        "survey_catalog",
        "run_report",
    ] {
        for ext in ["json", "yaml"] {
            let latest = fixture.output_dir.join(format!("{stem}_latest.{ext}"));
            assert!(latest.is_file(), "missing {}", latest.display());
        }
    }

    let report = fixture.latest_json("run_report");
    assert_eq!(report["processed"], json!(5));
    assert_eq!(report["succeeded"], json!(4));

    let complete = fixture.latest_json("complete_metadata");
    assert_eq!(complete.as_array().unwrap().len(), 4);

    // Curated output holds only the point-cloud entries.
    let curated = fixture.latest_json("curated_metadata");
    let entries = curated.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["curated"]["ml_features"]["point_density_category"] == json!("high"));
}

#[test]
fn curated_field_is_absent_not_null_in_serialized_records() {
    let fixture = mixed_survey();
    run(&fixture.options(false)).unwrap();

    let complete = fixture.latest_json("complete_metadata");
    for record in complete.as_array().unwrap() {
        if record["artifact_type"] == json!("point_cloud") {
            assert!(record.get("curated").is_some());
        } else {
            assert!(record.get("curated").is_none());
        }
    }
}

#[test]
fn run_fails_when_every_artifact_is_bad_but_still_writes_the_report() {
    let fixture = SurveyFixture::new();
    fixture.write_sidecar("only.laz", "{ not json");

    let err = run(&fixture.options(true)).unwrap_err();
    assert!(err.to_string().contains("all 1 artifacts failed"));

    let report = fixture.latest_json("run_report");
    assert_eq!(report["processed"], json!(1));
    assert_eq!(report["succeeded"], json!(0));
    assert_eq!(report["artifacts"][0]["status"], json!("failed"));
}

#[test]
fn empty_input_dir_is_an_error() {
    let fixture = SurveyFixture::new();
    let err = run(&fixture.options(true)).unwrap_err();
    assert!(err.to_string().contains("no .raw.json sidecars"));
}

#[test]
fn explicit_file_list_overrides_directory_scan() {
    let fixture = mixed_survey();
    let sidecar = fixture.input_dir.join("tile_001.laz.raw.json");

    let mut options = fixture.options(false);
    options.files = vec![sidecar];
    let outcome = run(&options).unwrap();
    assert_eq!(outcome.report.processed, 1);
    assert_eq!(outcome.report.succeeded, 1);
    assert_eq!(outcome.records[0].artifact_type, ArtifactType::PointCloud);
}
