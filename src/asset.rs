//! Packaging of local build artifacts before they are attached to a release.
use log::*;
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{ReleaseError, Result};

/// Name the asset is uploaded under: the base name of the original file.
pub fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ReleaseError::InvalidArgs(format!(
                "asset path has no file name: {}",
                path.display()
            ))
        })
}

/// Location of the archive created next to `source`.
pub fn archive_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Compress `source` into a single-entry deflated zip written alongside it
/// and return the archive path. Both file handles are closed before this
/// returns, on success and on error.
pub fn zip_file(source: &Path) -> Result<PathBuf> {
    let target = archive_path(source);
    let entry_name = asset_name(source)?;

    debug!("archiving {} into {}", source.display(), target.display());

    let input =
        File::open(source).map_err(|e| ReleaseError::local_io(source, e))?;
    let metadata = input
        .metadata()
        .map_err(|e| ReleaseError::local_io(source, e))?;

    let output =
        File::create(&target).map_err(|e| ReleaseError::local_io(&target, e))?;

    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u32::MAX as u64);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    let mut writer = ZipWriter::new(output);

    writer
        .start_file(entry_name, options)
        .map_err(|e| archive_error(source, e))?;

    io::copy(&mut BufReader::new(input), &mut writer)
        .map_err(|e| ReleaseError::local_io(source, e))?;

    writer.finish().map_err(|e| archive_error(source, e))?;

    Ok(target)
}

fn archive_error(path: &Path, source: zip::result::ZipError) -> ReleaseError {
    ReleaseError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn archive_sits_next_to_source() {
        assert_eq!(
            archive_path(Path::new("/build/out/app.tar.gz")),
            PathBuf::from("/build/out/app.tar.gz.zip")
        );
    }

    #[test]
    fn asset_name_is_base_name() {
        assert_eq!(asset_name(Path::new("dist/linux/app")).unwrap(), "app");
        assert!(asset_name(Path::new("/")).is_err());
    }

    #[test]
    fn zips_single_entry_with_original_content() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("binary");
        std::fs::write(&source, b"release payload").unwrap();

        let archive = zip_file(&source).unwrap();
        assert_eq!(archive, tmp.path().join("binary.zip"));

        let mut zip =
            zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 1);

        let mut entry = zip.by_index(0).unwrap();
        assert_eq!(entry.name(), "binary");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "release payload");
    }

    #[test]
    fn missing_source_is_local_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = zip_file(&tmp.path().join("absent")).unwrap_err();

        assert!(matches!(err, ReleaseError::LocalIo { .. }));
        assert!(!tmp.path().join("absent.zip").exists());
    }
}
