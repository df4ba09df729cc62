//! Output writing for metadata records and catalogs.
//!
//! Every logical output is written twice per format: a timestamped copy for
//! history and a `_latest` copy for easy downstream access. Field names are
//! identical across JSON and YAML.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output serialization formats selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Both,
}

impl OutputFormat {
    fn json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    fn yaml(self) -> bool {
        matches!(self, OutputFormat::Yaml | OutputFormat::Both)
    }
}

/// Filename stamp shared by every output of one run.
pub fn run_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Writes `<stem>_<stamp>` and `<stem>_latest` copies of `value` under
/// `output_dir` in the requested format(s). Returns the written paths.
pub fn write_pair<T: Serialize>(
    output_dir: &Path,
    stem: &str,
    stamp: &str,
    value: &T,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let mut written = Vec::new();
    if format.json() {
        let bytes = serde_json::to_vec_pretty(value).context("serialize JSON output")?;
        for name in [format!("{stem}_{stamp}.json"), format!("{stem}_latest.json")] {
            written.push(write_file(output_dir, &name, &bytes)?);
        }
    }
    if format.yaml() {
        let text = serde_yaml::to_string(value).context("serialize YAML output")?;
        for name in [format!("{stem}_{stamp}.yaml"), format!("{stem}_latest.yaml")] {
            written.push(write_file(output_dir, &name, text.as_bytes())?);
        }
    }
    Ok(written)
}

fn write_file(output_dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = output_dir.join(name);
    fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
