//! Semantic-version probing and comparison for candidate executables.

use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::exec::wait_with_deadline;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Flag passed to a candidate when probing its version.
pub const VERSION_FLAG: &str = "-v";

/// Run `binary -v` and return the first line of its output.
///
/// `None` covers every soft failure: the binary could not be spawned, did
/// not exit within 10 seconds (it is force-killed), or printed nothing.
pub fn query_version_line(binary: &Path) -> Option<String> {
    let mut child = Command::new(binary)
        .arg(VERSION_FLAG)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;
    match wait_with_deadline(&mut child, PROBE_TIMEOUT) {
        Ok(Some(_)) => {}
        _ => {
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
    }
    let mut output = String::new();
    child.stdout.take()?.read_to_string(&mut output).ok()?;
    output.lines().next().map(str::to_string)
}

/// Probe `binary` and check the detected version against `min_required`.
///
/// The version is extracted from the first output line with the
/// tool-specific `pattern` (capture group 1); any extraction miss leaves
/// the detected string empty, which then fails format validation.
pub fn binary_at_least(
    binary: &Path,
    pattern: &Regex,
    min_required: &str,
    include_equal: bool,
) -> Result<bool> {
    let line = query_version_line(binary).unwrap_or_default();
    let detected = pattern
        .captures(&line)
        .and_then(|caps| caps.get(1))
        .map_or(String::new(), |m| m.as_str().to_string());
    debug!("{} reports version {detected:?}", binary.display());
    at_least(&detected, min_required, include_equal)
}

/// Compare two version strings positionally, left to right.
///
/// Both strings must be 1-3 dot-separated non-negative integers; missing
/// trailing parts count as zero. The first unequal position decides; full
/// equality yields `include_equal`.
pub fn at_least(current: &str, min_required: &str, include_equal: bool) -> Result<bool> {
    let current = version_parts(current)?;
    let required = version_parts(min_required)?;
    for (cur, req) in current.iter().zip(required.iter()) {
        if cur > req {
            return Ok(true);
        }
        if cur < req {
            return Ok(false);
        }
    }
    Ok(include_equal)
}

fn version_parts(version: &str) -> Result<[u32; 3]> {
    let invalid = || Error::InvalidVersion(version.to_string());
    if version.is_empty() || version.split('.').count() > 3 {
        return Err(invalid());
    }
    let mut parts = [0u32; 3];
    for (slot, part) in parts.iter_mut().zip(version.split('.')) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        *slot = part.parse().map_err(|_| invalid())?;
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greater_is_valid_regardless_of_equality_flag() {
        assert!(at_least("8.2.1", "7.1", true).unwrap());
        assert!(at_least("8.2.1", "7.1", false).unwrap());
        assert!(at_least("7.1.1", "7.1.0", false).unwrap());
        assert!(at_least("10.0.0", "9.9.9", false).unwrap());
    }

    #[test]
    fn equal_follows_the_flag() {
        assert!(at_least("7.1.0", "7.1", true).unwrap());
        assert!(!at_least("7.1.0", "7.1", false).unwrap());
        assert!(at_least("7", "7.0.0", true).unwrap());
    }

    #[test]
    fn lesser_is_always_invalid() {
        assert!(!at_least("7.0.99", "7.1", true).unwrap());
        assert!(!at_least("5", "7.1", false).unwrap());
        assert!(!at_least("7.1", "7.1.1", true).unwrap());
    }

    #[test]
    fn short_versions_pad_with_zeros() {
        assert!(at_least("8", "8.0.0", true).unwrap());
        assert!(!at_least("8", "8.0.1", true).unwrap());
    }

    #[test]
    fn malformed_strings_fail_on_either_side() {
        for bad in ["", "abc", "7.", ".7", "7..1", "7.1.2.3", "7.x"] {
            assert!(matches!(
                at_least(bad, "7.1", true),
                Err(Error::InvalidVersion(_))
            ));
            assert!(matches!(
                at_least("7.1", bad, true),
                Err(Error::InvalidVersion(_))
            ));
        }
    }

    #[cfg(unix)]
    mod probing {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> std::path::PathBuf {
            let path = dir.join("fake-php");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn reads_first_output_line() {
            let dir = tempfile::tempdir().unwrap();
            let binary = script(dir.path(), "echo 'PHP 7.4.10 (cli)'; echo 'second line'");
            assert_eq!(
                query_version_line(&binary).as_deref(),
                Some("PHP 7.4.10 (cli)")
            );
        }

        #[test]
        fn probes_against_minimum() {
            let dir = tempfile::tempdir().unwrap();
            let pattern = Regex::new(r"PHP (\d+\.\d+\.\d+)").unwrap();

            let binary = script(dir.path(), "echo 'PHP 8.1.2 (cli) (built: stub)'");
            assert!(binary_at_least(&binary, &pattern, "7.1", true).unwrap());
            assert!(!binary_at_least(&binary, &pattern, "8.2", true).unwrap());
        }

        #[test]
        fn unextractable_output_is_a_format_error() {
            let dir = tempfile::tempdir().unwrap();
            let pattern = Regex::new(r"PHP (\d+\.\d+\.\d+)").unwrap();

            let binary = script(dir.path(), "echo 'no version here'");
            assert!(matches!(
                binary_at_least(&binary, &pattern, "7.1", true),
                Err(Error::InvalidVersion(_))
            ));
        }
    }
}
