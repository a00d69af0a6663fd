//! Zip packaging of one batch of QR images.
//!
//! The archive is written to a `.part` file next to its final name and renamed
//! once complete, so a failed batch never leaves a truncated `.zip` behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::Batch;
use crate::encoder::Record;
use crate::error::PackageError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// "QR Codes {start} - {end}", used for both the folder and the zip file.
pub fn archive_name(batch: &Batch) -> String {
    format!("QR Codes {}", batch.display_range())
}

/// Final path of the archive for `batch` inside `output_dir`.
pub fn archive_path(output_dir: &Path, batch: &Batch) -> PathBuf {
    output_dir.join(format!("{}.zip", archive_name(batch)))
}

fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sort `records` by numeric identifier and write them into
/// `output_dir/QR Codes {start} - {end}.zip`. Returns the final archive path.
pub fn package_batch(
    mut records: Vec<Record>,
    batch: &Batch,
    output_dir: &Path,
) -> Result<PathBuf, PackageError> {
    records.sort_by(|a, b| a.identifier.numeric_cmp(&b.identifier));

    fs::create_dir_all(output_dir).map_err(|source| PackageError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let final_path = archive_path(output_dir, batch);
    let part_path = temp_path(&final_path);
    let result = write_archive(&records, batch, &part_path).and_then(|()| {
        fs::rename(&part_path, &final_path).map_err(|source| PackageError::Rename {
            path: final_path.clone(),
            source,
        })
    });
    if let Err(err) = result {
        if part_path.exists() && fs::remove_file(&part_path).is_err() {
            tracing::warn!("could not remove {}", part_path.display());
        }
        return Err(err);
    }

    tracing::info!(
        batch = batch.number,
        images = records.len(),
        "wrote {}",
        final_path.display()
    );
    Ok(final_path)
}

fn write_archive(records: &[Record], batch: &Batch, path: &Path) -> Result<(), PackageError> {
    let file = File::create(path).map_err(|source| PackageError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let folder = format!("{}/", archive_name(batch));
    zip.add_directory(folder.as_str(), options)
        .map_err(|source| PackageError::Entry {
            entry: folder.clone(),
            source,
        })?;

    let mut previous: Option<&str> = None;
    for record in records {
        let id = record.identifier.as_str();
        // Same identifier and secret always give the same image.
        if previous == Some(id) {
            tracing::debug!(identifier = id, "skipping duplicate identifier");
            continue;
        }
        previous = Some(id);

        let entry = format!("{folder}{id}.png");
        zip.start_file(entry.as_str(), options)
            .map_err(|source| PackageError::Entry {
                entry: entry.clone(),
                source,
            })?;
        zip.write_all(&record.png)
            .map_err(|source| PackageError::Write { entry, source })?;
    }

    let file = zip.finish().map_err(|source| PackageError::Finalize {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| PackageError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
