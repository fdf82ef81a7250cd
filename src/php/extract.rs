//! Unpacking downloaded PHP builds.
//!
//! Supports:
//! - static-php-cli unix builds (tar.gz with the `php` binary at the root)
//! - static-php-cli Windows builds (zip with `php.exe`)
//! - Uncompressed binaries, copied as-is

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, trace};

use crate::php::error::ExtractError;

/// Archive format, derived from the download URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
    Raw,
}

impl ArchiveKind {
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            ArchiveKind::TarGz
        } else if path.ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            ArchiveKind::Raw
        }
    }
}

/// Unpack `archive` into `dest`.
///
/// For [`ArchiveKind::Raw`] the file itself is copied to `dest/binary_name`.
pub fn extract(
    archive: &Path,
    kind: ArchiveKind,
    dest: &Path,
    binary_name: &str,
) -> Result<(), ExtractError> {
    debug!(?archive, ?kind, ?dest, "Extracting");
    std::fs::create_dir_all(dest)?;

    match kind {
        ArchiveKind::TarGz => extract_tar_gz(archive, dest),
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::Raw => {
            std::fs::copy(archive, dest.join(binary_name))?;
            Ok(())
        }
    }
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        trace!(?path, "Unpacking tar entry");

        // unpack_in refuses entries that would land outside `dest`
        if !entry.unpack_in(dest)? {
            return Err(ExtractError::UnsafePath(path.display().to_string()));
        }
    }

    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(relative) = file.enclosed_name() else {
            return Err(ExtractError::UnsafePath(file.name().to_string()));
        };
        let outpath = dest.join(relative);
        trace!(?outpath, "Unpacking zip entry");

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&outpath)?;
        io::copy(&mut file, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}

/// Locate `binary_name` in an extracted tree, preferring shallower paths.
pub fn find_binary(dir: &Path, binary_name: &str) -> Result<PathBuf, ExtractError> {
    let mut pending = vec![dir.to_path_buf()];

    while !pending.is_empty() {
        let mut next = Vec::new();
        for current in pending {
            let candidate = current.join(binary_name);
            if candidate.is_file() {
                return Ok(candidate);
            }
            for entry in std::fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    next.push(path);
                }
            }
        }
        next.sort();
        pending = next;
    }

    Err(ExtractError::BinaryNotFound(binary_name.to_string()))
}

/// Set mode 0755 on unix; a no-op elsewhere
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// True if `path` is a regular file with an executable bit set
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    meta.is_file() && has_exec_bit(&meta)
}

#[cfg(unix)]
fn has_exec_bit(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_meta: &std::fs::Metadata) -> bool {
    true
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs::File;
    use std::path::Path;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tar::Builder;

    /// Write a tar.gz containing `files` (path, content, mode) to `path`
    pub fn write_tarball(path: &Path, files: &[(&str, &[u8], u32)]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (name, content, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(name).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append(&header, *content).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
}
