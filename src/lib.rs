//! Locate, verify, and drive the external `php-parse` toolchain to turn PHP
//! source files into AST dumps.
//!
//! The crate is built around the [`exec::ExternalBinary`] contract: a typed
//! argument/option store ([`config::BinaryConfig`]), a blocking process
//! runner with timeout and output caching, and a fallback-chain resolver
//! that produces a working executable from a caller-supplied path, a
//! checksum-verified cache, a bundled archive, or the system PATH.
//! [`php::PhpParser`] is the concrete tool wrapper; the raw dump it
//! produces is handed back as a file for someone else to consume.

pub mod archive;
pub mod checksum;
pub mod config;
pub mod error;
pub mod exec;
pub mod locate;
pub mod php;
pub mod platform;
pub mod resolve;
pub mod version;

pub use config::{BinaryConfig, ConfigValue};
pub use error::{Error, Result};
pub use exec::{ExecOutcome, ExternalBinary, TIMEOUT_EXIT_CODE};
pub use php::{DumpType, PhpParser};
pub use resolve::{Resolution, ResolvedBinary};
