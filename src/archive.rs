//! KMZ container I/O: zip extraction and deterministic repacking.

use std::fs::File;
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::Result;

/// Extract a `.kmz` archive into `dest`.
///
/// Member paths are sanitized via [`zip`]'s `enclosed_name`; entries that
/// would escape `dest` (absolute paths, `..` components) are logged and
/// skipped rather than written.
pub fn extract_kmz<P: AsRef<Path>, Q: AsRef<Path>>(kmz_path: P, dest: Q) -> Result<()> {
    let file = File::open(kmz_path.as_ref())?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel_path) = entry.enclosed_name() else {
            tracing::warn!("skipping unsafe archive member: {}", entry.name());
            continue;
        };
        let out_path = dest.as_ref().join(rel_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)?;
        io::copy(&mut entry, &mut out_file)?;
    }
    Ok(())
}

/// Pack a directory tree into a `.kmz` archive.
///
/// Members are written deflated in lexicographic path order (directories and
/// files sorted together at each level) so repacking the same tree always
/// produces the same member sequence. Directory entries themselves are not
/// emitted.
pub fn create_kmz<P: AsRef<Path>, Q: AsRef<Path>>(src_dir: P, kmz_path: Q) -> Result<()> {
    let src_dir = src_dir.as_ref();
    let file = File::create(kmz_path.as_ref())?;
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src_dir)
            .unwrap_or(entry.path());
        let arcname = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(&arcname, options)?;
        let mut src = File::open(entry.path())?;
        io::copy(&mut src, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

/// Member names of an archive in stored order.
pub fn list_members<P: AsRef<Path>>(kmz_path: P) -> Result<Vec<String>> {
    let file = File::open(kmz_path.as_ref())?;
    let mut archive = ZipArchive::new(file)?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index_raw(i)?.name().to_string());
    }
    Ok(names)
}
