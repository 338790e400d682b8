//! Typed argument/option store backing an [`ExternalBinary`].
//!
//! Arguments carry required semantics: reading one that was never given a
//! value (no default, never set) is a caller error. Options are soft:
//! reading an unset option yields `None`. Writing `None` to either kind is
//! a no-op and never clears a stored value.
//!
//! [`ExternalBinary`]: crate::exec::ExternalBinary

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::platform;

/// Default ceiling on one invocation's run time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A value held in an argument or option slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
    Path(PathBuf),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ConfigValue::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Render the value the way it appears on a command line.
    pub fn render(&self) -> String {
        match self {
            ConfigValue::Bool(value) => value.to_string(),
            ConfigValue::Text(text) => text.clone(),
            ConfigValue::Path(path) => path.display().to_string(),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<PathBuf> for ConfigValue {
    fn from(value: PathBuf) -> Self {
        ConfigValue::Path(value)
    }
}

/// Per-instance configuration of one external tool: named argument and
/// option slots plus the execution policy knobs (working directory,
/// timeout, output caching).
///
/// Not synchronized; callers sharing one instance across threads must
/// serialize access themselves.
#[derive(Debug, Clone)]
pub struct BinaryConfig {
    arguments: BTreeMap<String, Option<ConfigValue>>,
    options: BTreeMap<String, ConfigValue>,
    work_dir: PathBuf,
    timeout: Duration,
    cache_output: bool,
}

/// Exact copy of both slot maps, taken before a scoped override and pushed
/// back afterwards.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    arguments: BTreeMap<String, Option<ConfigValue>>,
    options: BTreeMap<String, ConfigValue>,
}

impl BinaryConfig {
    /// Fresh configuration for `tool_name`, with the working directory
    /// defaulted to the tool's cache directory under the system temp dir.
    pub fn new(tool_name: &str) -> Self {
        Self {
            arguments: BTreeMap::new(),
            options: BTreeMap::new(),
            work_dir: platform::binaries_dir(tool_name),
            timeout: DEFAULT_TIMEOUT,
            cache_output: false,
        }
    }

    /// Declare an argument slot. Declaring an existing name replaces the
    /// slot, keeping names unique.
    pub fn declare_argument(&mut self, name: &str, default: Option<ConfigValue>) {
        self.arguments.insert(name.to_string(), default);
    }

    /// Declare an option slot; a `None` default leaves the slot unset.
    pub fn declare_option(&mut self, name: &str, default: Option<ConfigValue>) {
        if let Some(default) = default {
            self.options.insert(name.to_string(), default);
        }
    }

    /// Read a required argument. Absence is a caller error, never a silent
    /// default.
    pub fn argument(&self, name: &str) -> Result<&ConfigValue> {
        self.arguments
            .get(name)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }

    /// Read an option; absent is a soft `None`.
    pub fn option(&self, name: &str) -> Option<&ConfigValue> {
        self.options.get(name)
    }

    /// Set an argument. A `None` write is a no-op.
    pub fn set_argument(&mut self, name: &str, value: Option<ConfigValue>) {
        if let Some(value) = value {
            self.arguments.insert(name.to_string(), Some(value));
        }
    }

    /// Set an option. A `None` write is a no-op.
    pub fn set_option(&mut self, name: &str, value: Option<ConfigValue>) {
        if let Some(value) = value {
            self.options.insert(name.to_string(), value);
        }
    }

    /// Names of the options currently holding `Bool(true)`.
    pub fn enabled_flags(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|(_, value)| matches!(value, ConfigValue::Bool(true)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn set_work_dir(&mut self, dir: PathBuf) {
        self.work_dir = dir;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn cache_output(&self) -> bool {
        self.cache_output
    }

    pub fn set_cache_output(&mut self, enabled: bool) {
        self.cache_output = enabled;
    }

    /// Capture both maps for a later [`restore`](Self::restore).
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            arguments: self.arguments.clone(),
            options: self.options.clone(),
        }
    }

    /// Replace both maps with the exact pre-snapshot state. Keys added after
    /// the snapshot do not survive restoration.
    pub fn restore(&mut self, snapshot: ConfigSnapshot) {
        self.arguments = snapshot.arguments;
        self.options = snapshot.options;
    }
}
