//! Locating executables in directory trees and on the system PATH.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Walk `dir` depth-first and return the first regular file whose name
/// exactly matches one of `names`. Any match is acceptable, so traversal
/// order does not affect correctness.
pub fn find_in(dir: &Path, names: &[String]) -> Option<PathBuf> {
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let Ok(entries) = fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file()
                && path
                    .file_name()
                    .and_then(OsStr::to_str)
                    .is_some_and(|name| names.iter().any(|candidate| candidate == name))
            {
                return Some(path);
            }
        }
    }
    None
}

/// Search the system PATH for an executable named `base`.
///
/// On Windows-family systems the `.exe` and `.bat` variants are tried
/// unless `base` already carries one of those suffixes; elsewhere only the
/// bare name is used. An unset PATH is a soft miss, not an error.
pub fn find_on_path(base: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    find_on_path_value(&path_var, base, cfg!(windows))
}

fn find_on_path_value(path_var: &OsStr, base: &str, windows: bool) -> Option<PathBuf> {
    let names = name_variants(base, windows);
    env::split_paths(path_var)
        .filter(|dir| dir.exists())
        .find_map(|dir| find_in(&dir, &names))
}

fn name_variants(base: &str, windows: bool) -> Vec<String> {
    if windows && !(base.ends_with(".exe") || base.ends_with(".bat")) {
        vec![format!("{base}.exe"), format!("{base}.bat")]
    } else {
        vec![base.to_string()]
    }
}
