//! Platform naming and the on-disk cache layout.

use std::env;
use std::path::PathBuf;

/// Namespace under the OS temp directory holding extracted binaries and
/// execution caches.
const TOOL_NAMESPACE: &str = "phast";

// Substring maps from raw OS/arch strings to the fixed vocabulary used in
// artifact and cache file names.
const OS_VOCAB: &[(&str, &str)] = &[
    ("mac", "macos"),
    ("win", "windows"),
    ("nix", "linux"),
    ("nux", "linux"),
    ("aix", "linux"),
];

const ARCH_VOCAB: &[(&str, &str)] = &[
    ("aarch64", "aarch64"),
    ("arm64", "aarch64"),
    ("x86_64", "x86_64"),
    ("amd64", "x86_64"),
];

/// Map a raw OS name (any casing, any vendor phrasing that contains a known
/// fragment) onto the fixed vocabulary.
pub fn normalize_os(raw: &str) -> Option<&'static str> {
    let raw = raw.to_lowercase();
    OS_VOCAB
        .iter()
        .find(|(fragment, _)| raw.contains(fragment))
        .map(|(_, name)| *name)
}

/// Map a raw architecture name onto the fixed vocabulary.
pub fn normalize_arch(raw: &str) -> Option<&'static str> {
    let raw = raw.to_lowercase();
    ARCH_VOCAB
        .iter()
        .find(|(fragment, _)| raw.contains(fragment))
        .map(|(_, name)| *name)
}

/// Normalized name of the OS this build targets.
pub fn host_os() -> Option<&'static str> {
    normalize_os(env::consts::OS)
}

/// Normalized name of the architecture this build targets.
pub fn host_arch() -> Option<&'static str> {
    normalize_arch(env::consts::ARCH)
}

/// `<temp>/phast/binaries/<tool>/`, the directory holding one tool's
/// extracted executables and its dot-prefixed execution cache files.
pub fn binaries_dir(tool: &str) -> PathBuf {
    env::temp_dir()
        .join(TOOL_NAMESPACE)
        .join("binaries")
        .join(tool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_names_normalize() {
        assert_eq!(normalize_os("Mac OS X"), Some("macos"));
        assert_eq!(normalize_os("Windows 11"), Some("windows"));
        assert_eq!(normalize_os("linux"), Some("linux"));
        assert_eq!(normalize_os("GNU/Linux"), Some("linux"));
        assert_eq!(normalize_os("AIX"), Some("linux"));
        assert_eq!(normalize_os("solaris"), None);
    }

    #[test]
    fn arch_names_normalize() {
        assert_eq!(normalize_arch("arm64"), Some("aarch64"));
        assert_eq!(normalize_arch("AARCH64"), Some("aarch64"));
        assert_eq!(normalize_arch("amd64"), Some("x86_64"));
        assert_eq!(normalize_arch("x86_64"), Some("x86_64"));
        assert_eq!(normalize_arch("riscv64"), None);
    }

    #[test]
    fn host_names_resolve() {
        // Every supported build target maps into the vocabulary.
        assert!(host_os().is_some());
        assert!(host_arch().is_some());
    }

    #[test]
    fn binaries_dir_layout() {
        let dir = binaries_dir("PhpParser");
        assert!(dir.starts_with(env::temp_dir()));
        assert!(dir.ends_with("phast/binaries/PhpParser"));
    }
}
