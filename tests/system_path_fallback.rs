//! PATH-based interpreter discovery, isolated in its own process because it
//! rewrites `PATH` and the resource-dir override.

#![cfg(unix)]

mod common;

use std::env;
use std::fs;

use phast::exec::ExternalBinary;
use phast::php::PhpParser;
use phast::resolve::{Resolution, RESOURCE_DIR_ENV};

#[test]
fn falls_back_to_a_path_interpreter() {
    let dir = tempfile::tempdir().unwrap();
    common::write_script(dir.path(), "php", common::STUB_INTERPRETER);
    let parser = dir.path().join("parser.phar");
    fs::write(&parser, b"phar stub").unwrap();

    env::remove_var(RESOURCE_DIR_ENV);
    let mut entries = vec![dir.path().to_path_buf()];
    entries.extend(env::split_paths(&env::var_os("PATH").unwrap_or_default()));
    env::set_var("PATH", env::join_paths(entries).unwrap());

    let mut tool = PhpParser::new(None, Some(parser)).unwrap();
    assert_eq!(tool.php().origin, Resolution::SystemPath);
    assert_eq!(tool.php().path, dir.path().join("php"));

    let target = dir.path().join("input.php");
    fs::write(&target, "<?php phpinfo();\n").unwrap();
    tool.config_mut().set_work_dir(dir.path().join("work"));
    tool.set_target(&target);

    let outcome = tool.execute().unwrap();
    assert!(outcome.success());
    assert!(fs::read_to_string(&outcome.output).unwrap().contains("phpinfo"));
}
