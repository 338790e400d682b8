//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script and return its path.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Build a zip archive holding the given `(entry name, bytes)` pairs.
pub fn make_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// A stub interpreter that answers `-v` with a healthy version banner and
/// otherwise echoes its arguments and the content of its last argument.
pub const STUB_INTERPRETER: &str = r#"if [ "$1" = "-v" ]; then
  echo "PHP 8.2.5 (cli) (built: stub)"
  exit 0
fi
for arg; do last=$arg; done
echo "parsed with: $*"
cat "$last""#;
