//! Batch driver: one synchronous pass over a pre-enumerated artifact list.
//!
//! Per-artifact failures are isolated — one bad file never aborts the rest
//! of the survey. Every skipped artifact keeps its failure reason in the run
//! report so "no buildings detected" stays distinguishable from "building
//! detection failed". Sidecars are visited in sorted path order so the
//! last-writer-wins merge downstream is reproducible across runs.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::assemble::{assemble, RawAttributeMap};
use crate::curate::{curate, CurationConfig};
use crate::output::{run_stamp, write_pair, OutputFormat};
use crate::schema::{
    ArtifactRecord, ArtifactStatus, ArtifactType, CuratedEntry, RunReport, RunStatus,
    SurveyCatalog,
};

/// Raw extractor outputs are consumed as `<artifact>.raw.json` sidecars
/// sitting next to the artifact bytes.
pub const RAW_SIDECAR_SUFFIX: &str = ".raw.json";

/// One extractor sidecar: the declared type plus the raw attribute mapping.
#[derive(Debug, Deserialize)]
struct RawSidecar {
    artifact_type: ArtifactType,
    attributes: RawAttributeMap,
}

#[derive(Debug)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    /// Explicit sidecar paths; when empty, `input_dir` is scanned instead.
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Whether to fold the extracted records into a survey catalog.
    pub build_catalog: bool,
    pub curation: CurationConfig,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub records: Vec<ArtifactRecord>,
    pub catalog: Option<SurveyCatalog>,
}

struct ArtifactFailure {
    artifact_type: Option<ArtifactType>,
    reason: String,
}

/// Extracts every enumerated artifact, aggregates the surviving subset when
/// requested, and writes all outputs. Fails only when nothing at all could
/// be extracted or an output cannot be written.
pub fn run(options: &RunOptions) -> Result<RunOutcome> {
    let sidecars = enumerate_sidecars(options)?;
    if sidecars.is_empty() {
        bail!(
            "no {RAW_SIDECAR_SUFFIX} sidecars found in {}",
            options.input_dir.display()
        );
    }

    let mut records: Vec<ArtifactRecord> = Vec::new();
    let mut statuses: Vec<ArtifactStatus> = Vec::new();
    for sidecar in &sidecars {
        let source_path = artifact_path_for(sidecar);
        match process_artifact(sidecar, &options.curation) {
            Ok(record) => {
                info!(
                    path = %source_path.display(),
                    artifact_type = %record.artifact_type,
                    "extracted artifact"
                );
                statuses.push(ArtifactStatus {
                    source_path,
                    artifact_type: Some(record.artifact_type),
                    status: RunStatus::Ok,
                    reason: None,
                });
                records.push(record);
            }
            Err(failure) => {
                warn!(
                    path = %source_path.display(),
                    reason = %failure.reason,
                    "skipping artifact"
                );
                statuses.push(ArtifactStatus {
                    source_path,
                    artifact_type: failure.artifact_type,
                    status: RunStatus::Failed,
                    reason: Some(failure.reason),
                });
            }
        }
    }

    let report = RunReport {
        generated_at: Utc::now(),
        processed: statuses.len() as u64,
        succeeded: records.len() as u64,
        skipped: (statuses.len() - records.len()) as u64,
        artifacts: statuses,
    };

    if records.is_empty() {
        // Still leave the failure reasons behind before giving up.
        let stamp = run_stamp(report.generated_at);
        write_pair(
            &options.output_dir,
            "run_report",
            &stamp,
            &report,
            options.format,
        )?;
        bail!(
            "all {} artifacts failed extraction; see run_report_latest",
            report.processed
        );
    }

    let catalog = if options.build_catalog {
        Some(aggregate(&records).context("aggregate survey records")?)
    } else {
        None
    };

    let stamp = run_stamp(report.generated_at);
    write_pair(
        &options.output_dir,
        "complete_metadata",
        &stamp,
        &records,
        options.format,
    )?;

    let curated: Vec<CuratedEntry> = records
        .iter()
        .filter_map(|record| {
            record.curated.clone().map(|curated| CuratedEntry {
                artifact_id: record.artifact_id.clone(),
                source_path: record.complete.source_path.clone(),
                curated,
            })
        })
        .collect();
    write_pair(
        &options.output_dir,
        "curated_metadata",
        &stamp,
        &curated,
        options.format,
    )?;

    if let Some(catalog) = &catalog {
        write_pair(
            &options.output_dir,
            "survey_catalog",
            &stamp,
            catalog,
            options.format,
        )?;
    }
    write_pair(
        &options.output_dir,
        "run_report",
        &stamp,
        &report,
        options.format,
    )?;

    info!(
        processed = report.processed,
        succeeded = report.succeeded,
        skipped = report.skipped,
        "run complete"
    );
    Ok(RunOutcome {
        report,
        records,
        catalog,
    })
}

/// Explicit `--files` list, or a scan of `input_dir` for raw sidecars.
/// Sorted either way for reproducible merge order.
fn enumerate_sidecars(options: &RunOptions) -> Result<Vec<PathBuf>> {
    let mut sidecars = if options.files.is_empty() {
        let entries = fs::read_dir(&options.input_dir)
            .with_context(|| format!("read {}", options.input_dir.display()))?;
        let mut found = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_sidecar(&path) {
                found.push(path);
            }
        }
        found
    } else {
        options.files.clone()
    };
    sidecars.sort();
    Ok(sidecars)
}

fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name.len() > RAW_SIDECAR_SUFFIX.len() && name.ends_with(RAW_SIDECAR_SUFFIX)
        })
}

/// The artifact a sidecar describes: its own path minus the sidecar suffix.
fn artifact_path_for(sidecar: &Path) -> PathBuf {
    let Some(name) = sidecar.file_name().and_then(|name| name.to_str()) else {
        return sidecar.to_path_buf();
    };
    match name.strip_suffix(RAW_SIDECAR_SUFFIX) {
        Some(stem) if !stem.is_empty() => sidecar.with_file_name(stem),
        _ => sidecar.to_path_buf(),
    }
}

fn process_artifact(
    sidecar: &Path,
    curation: &CurationConfig,
) -> Result<ArtifactRecord, ArtifactFailure> {
    if !is_sidecar(sidecar) {
        return Err(ArtifactFailure {
            artifact_type: None,
            reason: format!(
                "{} is not a {RAW_SIDECAR_SUFFIX} sidecar",
                sidecar.display()
            ),
        });
    }
    let text = fs::read_to_string(sidecar).map_err(|err| ArtifactFailure {
        artifact_type: None,
        reason: format!("read {}: {err}", sidecar.display()),
    })?;
    let raw: RawSidecar = serde_json::from_str(&text).map_err(|err| ArtifactFailure {
        artifact_type: None,
        reason: format!("parse {}: {err}", sidecar.display()),
    })?;

    let artifact_path = artifact_path_for(sidecar);
    let mut record = assemble(&artifact_path, raw.artifact_type, raw.attributes).map_err(
        |err| ArtifactFailure {
            artifact_type: Some(raw.artifact_type),
            reason: err.to_string(),
        },
    )?;

    if record.artifact_type == ArtifactType::PointCloud {
        let curated = curate(&record.complete, curation).map_err(|err| ArtifactFailure {
            artifact_type: Some(record.artifact_type),
            reason: err.to_string(),
        })?;
        record.curated = Some(curated);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_suffix_is_stripped_to_the_artifact_path() {
        let sidecar = Path::new("/survey/tiles/tile_001.laz.raw.json");
        assert_eq!(
            artifact_path_for(sidecar),
            PathBuf::from("/survey/tiles/tile_001.laz")
        );
    }

    #[test]
    fn non_sidecar_paths_are_left_alone() {
        let path = Path::new("/survey/tiles/tile_001.laz");
        assert_eq!(artifact_path_for(path), path.to_path_buf());
        assert!(!is_sidecar(path));
    }

    #[test]
    fn bare_suffix_is_not_a_valid_sidecar_name() {
        let path = Path::new("/survey/.raw.json");
        assert_eq!(artifact_path_for(path), path.to_path_buf());
    }
}
