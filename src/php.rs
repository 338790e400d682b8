//! The `php-parse` toolchain: resolution chains for the PHP interpreter and
//! the parser phar, and the [`PhpParser`] dump wrapper.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::info;

use crate::config::{BinaryConfig, ConfigValue};
use crate::error::{Error, Result};
use crate::exec::ExternalBinary;
use crate::locate::find_on_path;
use crate::platform::{binaries_dir, host_arch, host_os};
use crate::resolve::{bundled_archive, extract_bundled, verified_cache, Resolution, ResolvedBinary};
use crate::version::binary_at_least;

/// Minimum interpreter version the parser phar supports (inclusive).
pub const PHP_MIN_VERSION: &str = "7.1";

const TOOL_NAME: &str = "PhpParser";
const BUNDLED_PHP: &str = "php-cli-8.4";
const BUNDLED_PARSER: &str = "php-parser-4.19.4";
const PHP_ENTRIES: &[&str] = &["php", "php.exe"];
const PARSER_ENTRIES: &[&str] = &["php-parser.phar"];

const ARG_ENTRY_FILE: &str = "entryFile";
const ARG_DUMP_TYPE: &str = "dumpType";

pub const OPT_PRETTY_PRINT: &str = "--pretty-print";
pub const OPT_RESOLVE_NAMES: &str = "--resolve-names";
pub const OPT_WITH_COLUMN_INFO: &str = "--with-column-info";
pub const OPT_WITH_POSITIONS: &str = "--with-positions";
pub const OPT_WITH_RECOVERY: &str = "--with-recovery";

const BOOL_OPTIONS: &[&str] = &[
    OPT_PRETTY_PRINT,
    OPT_RESOLVE_NAMES,
    OPT_WITH_COLUMN_INFO,
    OPT_WITH_POSITIONS,
    OPT_WITH_RECOVERY,
];

/// Expected CRC32 digests of cached artifacts, keyed by deterministic file
/// name. A correctness check against partial extraction, not a security
/// boundary.
const CHECKSUMS: &[(&str, &str)] = &[
    ("php-cli-8.4-linux-aarch64", "714a9a7b"),
    ("php-cli-8.4-linux-x86_64", "afd3bd14"),
    ("php-cli-8.4-macos-aarch64", "7a3d2fca"),
    ("php-cli-8.4-macos-x86_64", "3500f339"),
    ("php-cli-8.4-windows-x86_64", "ef39e63d"),
    ("php-parser-4.19.4", "e5711434"),
];

fn expected_checksum(name: &str) -> Option<&'static str> {
    CHECKSUMS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, digest)| *digest)
}

fn php_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // First output line looks like "PHP 8.1.2 (cli) (built: ...)".
    PATTERN.get_or_init(|| Regex::new(r"PHP (\d+\.\d+\.\d+)").expect("static pattern"))
}

fn interpreter_artifact() -> String {
    let os = host_os().unwrap_or("unknown");
    let arch = host_arch().unwrap_or("unknown");
    format!("{BUNDLED_PHP}-{os}-{arch}")
}

/// Resolve a working PHP interpreter.
///
/// Order: caller-supplied (version-checked; rejection is fatal with no
/// fallback, distinguishing an explicit wrong choice from nothing
/// specified), checksum-verified cache, bundled archive for this
/// platform/architecture, then a version-filtered PATH search.
pub fn resolve_php(supplied: Option<PathBuf>) -> Result<ResolvedBinary> {
    if let Some(path) = supplied {
        if binary_at_least(&path, php_version_pattern(), PHP_MIN_VERSION, true)? {
            return Ok(ResolvedBinary {
                path,
                origin: Resolution::Supplied,
            });
        }
        return Err(Error::InvalidBinary {
            path,
            reason: format!("does not satisfy PHP >= {PHP_MIN_VERSION}"),
        });
    }

    let artifact = interpreter_artifact();
    let cache_path = binaries_dir(TOOL_NAME).join(&artifact);
    if let Some(cached) = verified_cache(&cache_path, expected_checksum(&artifact))? {
        return Ok(cached);
    }

    match bundled_archive(&format!("{artifact}.zip")) {
        Some(archive) => extract_bundled(archive, &cache_path, PHP_ENTRIES, "php"),
        // No interpreter bundle for this platform: take whatever PATH offers.
        None => resolve_php_from_path(),
    }
}

fn resolve_php_from_path() -> Result<ResolvedBinary> {
    if let Some(path) = find_on_path("php") {
        if binary_at_least(&path, php_version_pattern(), PHP_MIN_VERSION, true)? {
            return Ok(ResolvedBinary {
                path,
                origin: Resolution::SystemPath,
            });
        }
    }
    Err(Error::NotFound {
        name: format!("php {PHP_MIN_VERSION}+"),
        searched: "bundled resources or the system PATH".to_string(),
    })
}

/// Resolve the php-parser phar. A supplied path is accepted as-is; there is
/// no PATH fallback, so a missing bundle is fatal.
pub fn resolve_parser(supplied: Option<PathBuf>) -> Result<ResolvedBinary> {
    if let Some(path) = supplied {
        return Ok(ResolvedBinary {
            path,
            origin: Resolution::Supplied,
        });
    }

    let cache_path = binaries_dir(TOOL_NAME).join(BUNDLED_PARSER);
    if let Some(cached) = verified_cache(&cache_path, expected_checksum(BUNDLED_PARSER))? {
        return Ok(cached);
    }

    let archive = bundled_archive(&format!("{BUNDLED_PARSER}.zip")).ok_or_else(|| {
        Error::NotFound {
            name: "php-parser.phar".to_string(),
            searched: "bundled resources".to_string(),
        }
    })?;
    extract_bundled(archive, &cache_path, PARSER_ENTRIES, "php-parser.phar")
}

/// Output format produced by php-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpType {
    /// S-expression style node dump.
    #[default]
    SExpr,
    /// `var_dump` of the node tree.
    Var,
    /// JSON dump.
    Json,
}

impl DumpType {
    /// The php-parse flag selecting this format.
    pub fn flag(self) -> &'static str {
        match self {
            DumpType::SExpr => "--dump",
            DumpType::Var => "--var-dump",
            DumpType::Json => "--json-dump",
        }
    }
}

impl FromStr for DumpType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sexpr" | "s-expr" | "dump" => Ok(DumpType::SExpr),
            "var" | "var-dump" => Ok(DumpType::Var),
            "json" | "json-dump" => Ok(DumpType::Json),
            other => Err(format!("unknown dump format: {other}")),
        }
    }
}

/// Wrapper around the PHP interpreter plus the php-parse phar that turns
/// PHP source files into AST dumps.
///
/// Construction resolves both binaries up front and fails entirely when no
/// usable candidate exists, so a constructed instance is always runnable.
/// The raw dump lands in the outcome's output file; interpreting it is the
/// caller's business.
pub struct PhpParser {
    config: BinaryConfig,
    php: ResolvedBinary,
    parser: ResolvedBinary,
}

impl PhpParser {
    /// Resolve the toolchain and build a parser with default settings.
    pub fn new(php: Option<PathBuf>, parser: Option<PathBuf>) -> Result<Self> {
        let php = resolve_php(php)?;
        let parser = resolve_parser(parser)?;
        info!(
            "php: {} ({:?}), parser: {} ({:?})",
            php.path.display(),
            php.origin,
            parser.path.display(),
            parser.origin
        );
        Ok(Self::assemble(php, parser))
    }

    /// Build a parser from pre-resolved binaries, skipping the fallback
    /// chain entirely. Both paths are trusted as-is.
    pub fn with_binaries(php: PathBuf, parser: PathBuf) -> Self {
        Self::assemble(
            ResolvedBinary {
                path: php,
                origin: Resolution::Supplied,
            },
            ResolvedBinary {
                path: parser,
                origin: Resolution::Supplied,
            },
        )
    }

    fn assemble(php: ResolvedBinary, parser: ResolvedBinary) -> Self {
        let mut config = BinaryConfig::new(TOOL_NAME);
        config.declare_argument(ARG_ENTRY_FILE, None);
        config.declare_argument(
            ARG_DUMP_TYPE,
            Some(ConfigValue::Text(DumpType::default().flag().to_string())),
        );
        for flag in BOOL_OPTIONS {
            config.declare_option(flag, Some(ConfigValue::Bool(false)));
        }
        Self {
            config,
            php,
            parser,
        }
    }

    pub fn php(&self) -> &ResolvedBinary {
        &self.php
    }

    pub fn parser(&self) -> &ResolvedBinary {
        &self.parser
    }

    /// The PHP file to parse. Required before execution.
    pub fn set_target(&mut self, target: impl Into<PathBuf>) {
        self.config
            .set_argument(ARG_ENTRY_FILE, Some(ConfigValue::Path(target.into())));
    }

    pub fn set_dump_type(&mut self, dump: DumpType) {
        self.config
            .set_argument(ARG_DUMP_TYPE, Some(ConfigValue::Text(dump.flag().to_string())));
    }

    /// Enable or disable one of the boolean parse flags (`OPT_*` constants).
    pub fn set_flag(&mut self, name: &str, enabled: bool) {
        self.config.set_option(name, Some(ConfigValue::Bool(enabled)));
    }
}

impl ExternalBinary for PhpParser {
    fn config(&self) -> &BinaryConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut BinaryConfig {
        &mut self.config
    }

    fn command(&self) -> Result<Vec<String>> {
        let target = self.config.argument(ARG_ENTRY_FILE)?;
        let dump = self.config.argument(ARG_DUMP_TYPE)?;
        let mut command = vec![
            self.php.path.display().to_string(),
            self.parser.path.display().to_string(),
        ];
        command.extend(self.config.enabled_flags().iter().map(|flag| flag.to_string()));
        command.push(dump.render());
        command.push(target.render());
        Ok(command)
    }
}
