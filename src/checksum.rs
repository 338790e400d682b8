//! CRC32 file digests for validating cached and extracted binaries.
//!
//! CRC32 is a corruption check against partial or interrupted extraction,
//! not a security boundary; the bundled binaries are trusted input.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BLOCK_SIZE: usize = 16 * 1024;

/// Compute the CRC32 digest of a file as an 8-character lowercase,
/// zero-padded hex string.
///
/// Returns `Ok(None)` when the path does not exist or is not a regular
/// file. The digest depends only on byte content (no line-ending
/// translation), so identical bytes hash identically on every platform.
pub fn crc32_file(path: &Path) -> io::Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut file = File::open(path)?;
    let mut hasher = crc32fast::Hasher::new();
    let mut block = [0u8; BLOCK_SIZE];
    loop {
        let read = file.read(&mut block)?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }
    Ok(Some(format!("{:08x}", hasher.finalize())))
}

/// CRC32 of an in-memory byte string, formatted like [`crc32_file`].
pub(crate) fn crc32_hex(bytes: &[u8]) -> String {
    format!("{:08x}", crc32fast::hash(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn known_check_value() {
        // CRC32 of "123456789" is the standard check value 0xcbf43926.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check.bin");
        fs::write(&path, b"123456789").unwrap();
        assert_eq!(crc32_file(&path).unwrap().as_deref(), Some("cbf43926"));
    }

    #[test]
    fn identical_content_hashes_identically() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("nested").join("second");
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&first, b"same bytes").unwrap();
        fs::write(&second, b"same bytes").unwrap();

        let a = crc32_file(&first).unwrap();
        let b = crc32_file(&second).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, crc32_file(&first).unwrap());
    }

    #[test]
    fn missing_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(crc32_file(&dir.path().join("absent")).unwrap().is_none());
        // A directory is not a regular file either.
        assert!(crc32_file(dir.path()).unwrap().is_none());
    }

    #[test]
    fn zero_padded_digest() {
        assert_eq!(crc32_hex(b"").len(), 8);
        assert_eq!(crc32_hex(b""), "00000000");
    }
}
