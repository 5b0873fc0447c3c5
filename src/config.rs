//! Tool configuration.
//!
//! Every setting both commands need is resolved once at startup into a
//! [`Config`] record and passed down explicitly. Nothing below `main` reads
//! the process environment.
//!
//! ## Resolution Order
//!
//! ```text
//! stock defaults  →  --config FILE (optional TOML)  →  environment variables
//! ```
//!
//! Later layers override earlier ones key by key. The TOML layer is sparse:
//! a file only needs the keys it wants to change.
//!
//! ## Configuration File
//!
//! ```toml
//! [provision]
//! python_bin = "python3.12"          # env: PYTHON_BIN
//!
//! [convert]
//! script = "convert_ontologies.py"
//! source_dir = "../src"              # --source-dir
//! basis = "ttl"                      # --basis
//! # template = "templates/ontology.html.j2"
//!
//! [publish]
//! site = "hashgraphontology.xyz"     # positional SITE argument wins
//! deployment_dir = "../deployment"   # env: DEPLOYMENT_DIR (relative to --root)
//! target_root = "/var/www"           # env: TARGET_ROOT
//! use_sudo = true                    # env: USE_SUDO ("false" in any case disables)
//! rsync_bin = "rsync"                # env: RSYNC_BIN
//! chown_bin = "chown"
//! web_user = "www-data"              # env: WEB_USER
//! web_group = "www-data"             # env: WEB_GROUP
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site name used when `publish` is given no positional argument.
pub const DEFAULT_SITE: &str = "hashgraphontology.xyz";

/// Resolved configuration for both commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Environment provisioner settings.
    pub provision: ProvisionConfig,
    /// Ontology conversion settings.
    pub convert: ConvertConfig,
    /// Site publisher settings.
    pub publish: PublishConfig,
}

/// Settings for `ontology-site provision`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    /// Interpreter looked up on `PATH` and used to create the venv.
    pub python_bin: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            python_bin: "python3.12".to_string(),
        }
    }
}

/// Settings for `ontology-site convert`.
///
/// Relative paths are taken from the `--root` directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Conversion script run with the venv's interpreter.
    pub script: PathBuf,
    /// Tree searched recursively for ontology sources.
    pub source_dir: PathBuf,
    /// Extension of the source files, with or without the leading dot.
    pub basis: String,
    /// HTML template handed to the script. Unset keeps the script's own default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from("convert_ontologies.py"),
            source_dir: PathBuf::from("../src"),
            basis: "ttl".to_string(),
            template: None,
        }
    }
}

impl ConvertConfig {
    /// `basis` without leading dots, lowercased: `".TTL"` → `"ttl"`.
    pub fn extension(&self) -> String {
        self.basis.trim().trim_start_matches('.').to_lowercase()
    }
}

/// Settings for `ontology-site publish` and `render`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Default site name, appended to `target_root`.
    pub site: String,
    /// Source of truth mirrored to the web root. Relative paths are taken
    /// from the `--root` directory.
    pub deployment_dir: PathBuf,
    /// Web root that holds one directory per site.
    pub target_root: PathBuf,
    /// Whether collaborator commands are prefixed with `sudo`.
    pub use_sudo: SudoMode,
    /// Mirror-copy program.
    pub rsync_bin: String,
    /// Ownership-change program.
    pub chown_bin: String,
    /// Owner applied to the published tree.
    pub web_user: String,
    /// Group applied to the published tree.
    pub web_group: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            site: DEFAULT_SITE.to_string(),
            deployment_dir: PathBuf::from("../deployment"),
            target_root: PathBuf::from("/var/www"),
            use_sudo: SudoMode::Enabled,
            rsync_bin: "rsync".to_string(),
            chown_bin: "chown".to_string(),
            web_user: "www-data".to_string(),
            web_group: "www-data".to_string(),
        }
    }
}

impl PublishConfig {
    /// Deployment directory resolved against the tool root.
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.deployment_dir)
    }
}

/// Elevation wrapper switch.
///
/// Parsed from text with exactly one exception: `false`, in any letter case,
/// disables the wrapper. Every other value enables it, including `0`, `no`
/// and the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum SudoMode {
    Enabled,
    Disabled,
}

impl SudoMode {
    pub fn from_flag(value: &str) -> Self {
        if value.eq_ignore_ascii_case("false") {
            SudoMode::Disabled
        } else {
            SudoMode::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == SudoMode::Enabled
    }
}

impl From<bool> for SudoMode {
    fn from(enabled: bool) -> Self {
        if enabled {
            SudoMode::Enabled
        } else {
            SudoMode::Disabled
        }
    }
}

impl From<SudoMode> for bool {
    fn from(mode: SudoMode) -> Self {
        mode.is_enabled()
    }
}

impl Config {
    /// Validate values that would otherwise only fail deep inside a collaborator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("provision.python_bin", &self.provision.python_bin),
            ("publish.site", &self.publish.site),
            ("publish.rsync_bin", &self.publish.rsync_bin),
            ("publish.chown_bin", &self.publish.chown_bin),
            ("publish.web_user", &self.publish.web_user),
            ("publish.web_group", &self.publish.web_group),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !is_single_component(&self.publish.site) {
            return Err(ConfigError::Validation(format!(
                "publish.site must be a single directory name, got '{}'",
                self.publish.site
            )));
        }
        if self.convert.extension().is_empty() {
            return Err(ConfigError::Validation(
                "convert.basis must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Unset and empty variables both leave the current value alone.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = lookup("PYTHON_BIN") {
            self.provision.python_bin = v;
        }
        if let Some(v) = lookup("DEPLOYMENT_DIR") {
            self.publish.deployment_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TARGET_ROOT") {
            self.publish.target_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("USE_SUDO") {
            self.publish.use_sudo = SudoMode::from_flag(&v);
        }
        if let Some(v) = lookup("RSYNC_BIN") {
            self.publish.rsync_bin = v;
        }
        if let Some(v) = lookup("WEB_USER") {
            self.publish.web_user = v;
        }
        if let Some(v) = lookup("WEB_GROUP") {
            self.publish.web_group = v;
        }
    }
}

/// One plain directory name: no separators, no `.` or `..`, no root.
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Resolve the full configuration: defaults, optional file, then environment.
pub fn resolve<F>(file: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = stock_defaults_value()?;
    let merged = match file {
        Some(path) => merge_toml(base, load_raw_config(path)?),
        None => base,
    };
    let mut config: Config = merged.try_into()?;
    config.apply_env(lookup);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `ontology-site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ontology-site configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Environment variables (named next to each key) override this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Environment provisioner
# ---------------------------------------------------------------------------
[provision]
# Interpreter used to create <root>/venv. Must be on PATH.   (PYTHON_BIN)
python_bin = "python3.12"

# ---------------------------------------------------------------------------
# Ontology conversion
# ---------------------------------------------------------------------------
[convert]
# Conversion script, run with <root>/venv's python. Relative to --root.
script = "convert_ontologies.py"

# Tree searched recursively for sources, relative to --root.  (--source-dir)
source_dir = "../src"

# Extension of the source files.                               (--basis)
basis = "ttl"

# HTML template for the catalogue pages. Leave unset to use the script's own.
# template = "templates/ontology.html.j2"

# ---------------------------------------------------------------------------
# Site publisher
# ---------------------------------------------------------------------------
[publish]
# Site directory under target_root. The SITE argument overrides it.
site = "hashgraphontology.xyz"

# Directory mirrored to the web root, relative to --root.  (DEPLOYMENT_DIR)
deployment_dir = "../deployment"

# Web root holding one directory per site.                   (TARGET_ROOT)
target_root = "/var/www"

# Prefix rsync and chown with sudo.                          (USE_SUDO)
# In the environment only the literal "false" (any case) disables it.
use_sudo = true

# Mirror-copy program, run as `rsync -av --delete SRC/ DEST/`.  (RSYNC_BIN)
rsync_bin = "rsync"

# Ownership program, run as `chown -R USER:GROUP DEST/`.
chown_bin = "chown"

# Owner and group of the published tree.          (WEB_USER, WEB_GROUP)
web_user = "www-data"
web_group = "www-data"
"##
}
