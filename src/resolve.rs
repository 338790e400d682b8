//! Building blocks for the fallback-chain resolution of external
//! executables: provenance tags, bundled-resource lookup, checksum-verified
//! cache hits, and extraction from bundles.

use serde::Serialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::archive::{extract_entry, make_executable};
use crate::checksum::crc32_file;
use crate::error::{Error, Result};

/// Environment variable overriding where bundled archives are looked up.
pub const RESOURCE_DIR_ENV: &str = "PHAST_RESOURCE_DIR";

/// How a binary was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Explicit caller-supplied path.
    Supplied,
    /// Previously extracted copy with a matching checksum.
    Cache,
    /// Freshly extracted from a bundled archive.
    Extracted,
    /// Discovered on the system PATH.
    SystemPath,
}

/// A resolved executable together with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    pub origin: Resolution,
}

/// Open a bundled archive by exact file name.
///
/// Searches [`RESOURCE_DIR_ENV`] (when set), then the running executable's
/// `resources/` sibling and its own directory, the native equivalent of
/// the program's resource space.
pub fn bundled_archive(file_name: &str) -> Option<File> {
    for dir in resource_dirs() {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            debug!("found bundled archive {}", candidate.display());
            return File::open(candidate).ok();
        }
    }
    None
}

fn resource_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = env::var_os(RESOURCE_DIR_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("resources"));
        dirs.push(exe_dir);
    }
    dirs
}

/// Return the cached copy at `cache_path` when its CRC32 matches
/// `expected`. A missing file, an unknown expected digest, or a mismatch
/// (partial extraction, corruption) all miss quietly.
pub fn verified_cache(
    cache_path: &Path,
    expected: Option<&str>,
) -> Result<Option<ResolvedBinary>> {
    let Some(expected) = expected else {
        return Ok(None);
    };
    match crc32_file(cache_path)? {
        Some(digest) if digest == expected => {
            debug!("checksum match for cached {}", cache_path.display());
            Ok(Some(ResolvedBinary {
                path: cache_path.to_path_buf(),
                origin: Resolution::Cache,
            }))
        }
        _ => Ok(None),
    }
}

/// Extract one of `entry_candidates` from `archive` to `cache_path` and
/// mark the result executable. An archive without any matching entry is
/// fatal.
pub fn extract_bundled(
    archive: File,
    cache_path: &Path,
    entry_candidates: &[&str],
    name: &str,
) -> Result<ResolvedBinary> {
    if !extract_entry(archive, cache_path, entry_candidates)? {
        return Err(Error::NotFound {
            name: name.to_string(),
            searched: "the bundled archive".to_string(),
        });
    }
    make_executable(cache_path)?;
    info!("extracted {name} to {}", cache_path.display());
    Ok(ResolvedBinary {
        path: cache_path.to_path_buf(),
        origin: Resolution::Extracted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn cache_miss_on_unknown_digest_or_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool");
        assert!(verified_cache(&path, None).unwrap().is_none());
        assert!(verified_cache(&path, Some("cbf43926")).unwrap().is_none());
    }

    #[test]
    fn cache_hit_requires_matching_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool");
        fs::write(&path, b"123456789").unwrap();

        assert!(verified_cache(&path, Some("00000000")).unwrap().is_none());
        let hit = verified_cache(&path, Some("cbf43926")).unwrap().unwrap();
        assert_eq!(hit.origin, Resolution::Cache);
        assert_eq!(hit.path, path);
    }

    #[test]
    fn extract_bundled_fails_without_matching_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("empty.zip");
        {
            let file = File::create(&archive_path).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("unrelated", options).unwrap();
            writer.write_all(b"x").unwrap();
            writer.finish().unwrap();
        }

        let result = extract_bundled(
            File::open(&archive_path).unwrap(),
            &dir.path().join("out"),
            &["php"],
            "php",
        );
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }
}
