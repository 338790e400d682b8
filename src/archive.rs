//! Single-entry extraction from bundled zip archives.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Extract the first archive entry whose name matches one of `candidates`
/// into `dest`, creating parent directories as needed.
///
/// Candidate names and entry names are compared with `\` normalized to `/`,
/// so in-archive paths may be spelled in either separator style. Returns
/// `false` with `dest` untouched when no entry matches; entries after the
/// first match are not scanned.
pub fn extract_entry<R: Read + Seek>(reader: R, dest: &Path, candidates: &[&str]) -> Result<bool> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let targets: Vec<String> = candidates.iter().map(|name| uniform(name)).collect();
    let mut archive = zip::ZipArchive::new(reader)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !targets.iter().any(|target| *target == uniform(entry.name())) {
            continue;
        }
        debug!("extracting {} to {}", entry.name(), dest.display());
        let mut out = File::create(dest)?;
        io::copy(&mut entry, &mut out)?;
        return Ok(true);
    }
    Ok(false)
}

fn uniform(name: &str) -> String {
    name.replace('\\', "/")
}

/// Set the executable bits on a file. A no-op on Windows.
#[allow(unused_variables)]
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}
