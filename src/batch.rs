//! Subfolder batch driver.
//!
//! Each subfolder of the input root is one unit: exactly one `.kmz`
//! container plus a set of `.png` overlays. Units are processed one at a
//! time, each in its own temporary working directory, and a failed unit
//! never stops the batch unless the failure is a system error.

use std::path::{Path, PathBuf};

use crate::archive::{create_kmz, extract_kmz};
use crate::error::{Error, Result};
use crate::kml::{parse_kml, write_kml};
use crate::overlay::{copy_assets, expand_overlays};

/// Outcome of processing one unit directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// A transformed container was written to this path.
    Processed(PathBuf),
    /// The unit was skipped for the given reason; the batch continues.
    Skipped(String),
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped
    }
}

/// Process every subfolder of `input_root`, writing one transformed
/// container per unit into `output_dir`.
///
/// Input-shape problems (no container, no assets, no overlay element,
/// unparseable KML) skip the unit; I/O and archive errors propagate and
/// halt the batch.
pub fn process_root<P: AsRef<Path>, Q: AsRef<Path>>(
    input_root: P,
    output_dir: Q,
) -> Result<BatchSummary> {
    let units = sorted_subdirs(input_root.as_ref())?;
    if units.is_empty() {
        tracing::warn!("no subfolders found in {}", input_root.as_ref().display());
    }

    let mut summary = BatchSummary::default();
    for unit_dir in units {
        tracing::info!("processing subfolder: {}", unit_dir.display());
        match process_unit(&unit_dir, output_dir.as_ref())? {
            UnitOutcome::Processed(path) => {
                tracing::info!("created: {}", path.display());
                summary.processed += 1;
            }
            UnitOutcome::Skipped(reason) => {
                tracing::warn!("skipping {}: {}", unit_dir.display(), reason);
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Process a single unit directory into `<output_dir>/<unit> - transparent.kmz`.
///
/// The container is extracted into a unit-scoped temporary directory whose
/// cleanup is guaranteed by `Drop`, on success and failure alike.
pub fn process_unit(unit_dir: &Path, output_dir: &Path) -> Result<UnitOutcome> {
    let unit_name = unit_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let kmz_files = files_with_extension(unit_dir, "kmz")?;
    let Some(kmz_path) = kmz_files.first() else {
        return Ok(UnitOutcome::Skipped("no .kmz container found".into()));
    };
    if kmz_files.len() > 1 {
        tracing::warn!(
            "multiple .kmz files in {}, using lexicographically first: {}",
            unit_dir.display(),
            kmz_path.display()
        );
    }

    let assets = files_with_extension(unit_dir, "png")?;
    if assets.is_empty() {
        return Ok(UnitOutcome::Skipped("no .png assets found".into()));
    }

    // Working directory is isolated per unit and removed on every exit path.
    let workdir = tempfile::Builder::new()
        .prefix("kmzkit-extract-")
        .tempdir_in(output_dir)?;
    extract_kmz(kmz_path, workdir.path())?;

    let Some(kml_path) = find_kml(workdir.path()) else {
        return Ok(UnitOutcome::Skipped(format!(
            "no .kml document inside {}",
            kmz_path.display()
        )));
    };

    // Decode explicitly: a non-UTF-8 document is a malformed unit, not a
    // batch-halting I/O failure.
    let bytes = std::fs::read(&kml_path)?;
    let mut root = match String::from_utf8(bytes)
        .map_err(Error::from)
        .and_then(|content| parse_kml(&content))
    {
        Ok(root) => root,
        Err(e @ (Error::Xml(_) | Error::InvalidKml(_) | Error::Utf8(_))) => {
            return Ok(UnitOutcome::Skipped(format!("malformed KML: {e}")));
        }
        Err(e) => return Err(e),
    };

    match expand_overlays(&mut root, &assets, &unit_name) {
        Ok(report) => {
            tracing::debug!(
                "template asset: {}",
                report.template_asset.as_deref().unwrap_or("(none)")
            );
        }
        Err(Error::NoOverlayFound) => {
            return Ok(UnitOutcome::Skipped("no GroundOverlay in KML document".into()));
        }
        Err(e) => return Err(e),
    }

    let kml_dir = kml_path.parent().unwrap_or(workdir.path());
    copy_assets(&assets, kml_dir, &unit_name)?;
    std::fs::write(&kml_path, write_kml(&root)?)?;

    let out_path = output_dir.join(format!("{unit_name} - transparent.kmz"));
    create_kmz(workdir.path(), &out_path)?;
    Ok(UnitOutcome::Processed(out_path))
}

/// Immediate subdirectories of `root`, sorted by name.
fn sorted_subdirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Files directly inside `dir` with the given extension, case-insensitive,
/// sorted by name.
fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext));
        if matches && entry.file_type()?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// First `.kml` file under `root`, walking in sorted order.
fn find_kml(root: &Path) -> Option<PathBuf> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .map(walkdir::DirEntry::into_path)
        .find(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case("kml"))
        })
}
