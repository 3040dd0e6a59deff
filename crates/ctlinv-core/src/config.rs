//! Configuration loading and resolution
//!
//! Options come from a YAML or TOML file, with any key the file leaves out
//! filled from the environment. Resolution takes the environment as a
//! lookup function and produces an immutable [`Options`].

use std::fmt;
use std::path::{Path, PathBuf};

use ctlinv_api::requests::InventoryLookup;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{InventoryError, Result};

/// Value the `plugin` key must carry in a config file
pub const PLUGIN_NAME: &str = "controllerx";

/// Source path meaning "read everything from the environment"
pub const ENV_SOURCE: &str = "@controllerx_inventory";

const FILE_SUFFIXES: [&str; 6] = [
    "controllerx_inventory.yml",
    "controllerx_inventory.yaml",
    "controllerx_inventory.toml",
    "controllerx.yml",
    "controllerx.yaml",
    "controllerx.toml",
];

/// Environment variables consulted for missing keys
pub mod env {
    pub const HOST: &str = "CONTROLLER_HOST";
    pub const USERNAME: &str = "CONTROLLER_USERNAME";
    pub const PASSWORD: &str = "CONTROLLER_PASSWORD";
    pub const INVENTORY: &str = "CONTROLLER_INVENTORY";
    pub const HOSTS_FILTER: &str = "HOSTS_FILTER";
    pub const HOSTGROUPS_FILTER: &str = "HOSTGROUPS_FILTER";
    pub const GROUPS_FILTER: &str = "GROUPS_FILTER";
    pub const VERIFY_SSL: &str = "CONTROLLER_VERIFY_SSL";
    pub const METADATA_ENABLED: &str = "METADATA_ENABLED";
}

/// Where configuration is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Environment variables only
    Environment,
    /// A config file, with the environment filling gaps
    File(PathBuf),
}

impl ConfigSource {
    /// Check that a path names something this plugin reads
    ///
    /// # Errors
    /// Returns `InventoryError::Config` if the file name does not end with
    /// one of the recognised suffixes.
    pub fn verify(path: impl AsRef<str>) -> Result<Self> {
        let path = path.as_ref();
        if path.ends_with(ENV_SOURCE) {
            return Ok(ConfigSource::Environment);
        }
        if FILE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
            return Ok(ConfigSource::File(PathBuf::from(path)));
        }
        Err(InventoryError::Config(format!(
            "{path} is not a {PLUGIN_NAME} source; expected a file ending in \
             controllerx_inventory.(yml|yaml|toml) or controllerx.(yml|yaml|toml), or {ENV_SOURCE}"
        )))
    }

    /// Read the raw settings for this source
    ///
    /// # Errors
    /// Returns `InventoryError::Config` if the file cannot be read or
    /// parsed, or does not declare `plugin: controllerx`.
    pub fn load(&self) -> Result<PluginConfig> {
        match self {
            ConfigSource::Environment => Ok(PluginConfig::default()),
            ConfigSource::File(path) => PluginConfig::from_file(path),
        }
    }
}

/// Settings as written in a config file, every key optional
#[derive(Clone, Default, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub plugin: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Integer or string, checked during resolution
    #[serde(default)]
    pub inventory_name: Option<Value>,
    #[serde(default)]
    pub hosts_filter: Option<String>,
    #[serde(default)]
    pub hostgroups_filter: Option<String>,
    #[serde(default)]
    pub groups_filter: Option<String>,
    #[serde(default, alias = "verify_ssl")]
    pub validate_certs: Option<Flag>,
    #[serde(default)]
    pub include_metadata: Option<Flag>,
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("plugin", &self.plugin)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("inventory_name", &self.inventory_name)
            .field("hosts_filter", &self.hosts_filter)
            .field("hostgroups_filter", &self.hostgroups_filter)
            .field("groups_filter", &self.groups_filter)
            .field("validate_certs", &self.validate_certs)
            .field("include_metadata", &self.include_metadata)
            .finish()
    }
}

impl PluginConfig {
    /// Load from a YAML (`.yml`/`.yaml`) or TOML (`.toml`) file
    ///
    /// # Errors
    /// Returns `InventoryError::Config` if the file cannot be read, does
    /// not parse, or its `plugin` key is not `controllerx`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InventoryError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        let config: PluginConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                InventoryError::Config(format!("invalid TOML in {}: {e}", path.display()))
            })?,
            _ => serde_yaml::from_str(&content).map_err(|e| {
                InventoryError::Config(format!("invalid YAML in {}: {e}", path.display()))
            })?,
        };

        match config.plugin.as_deref() {
            Some(PLUGIN_NAME) => {}
            Some(other) => {
                return Err(InventoryError::Config(format!(
                    "{} is for plugin {other:?}, not {PLUGIN_NAME:?}",
                    path.display()
                )));
            }
            None => {
                return Err(InventoryError::Config(format!(
                    "{} does not set plugin: {PLUGIN_NAME}",
                    path.display()
                )));
            }
        }

        debug!(path = %path.display(), "loaded plugin config");
        Ok(config)
    }
}

/// Boolean option as written in a file
///
/// Accepts real booleans, `0`/`1`, and the usual truthy/falsy words.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Flag {
    fn resolve(&self, key: &str) -> Result<bool> {
        match self {
            Flag::Bool(b) => Ok(*b),
            Flag::Int(0) => Ok(false),
            Flag::Int(1) => Ok(true),
            Flag::Int(n) => Err(InventoryError::Config(format!(
                "invalid boolean for {key}: {n}"
            ))),
            Flag::Text(text) => parse_bool(key, text),
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "1" => Ok(true),
        "false" | "no" | "off" | "n" | "0" => Ok(false),
        _ => Err(InventoryError::Config(format!(
            "invalid boolean for {key}: {raw:?}"
        ))),
    }
}

/// How the target inventory is identified
///
/// Both forms are resolved to a primary key through the name lookup,
/// including names made only of digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryRef {
    /// Inventory name
    Name(String),
    /// `name++organization` named URL slug
    Slug { name: String, organization: String },
}

impl InventoryRef {
    /// Parse a textual identifier, kept verbatim
    ///
    /// # Errors
    /// Returns `InventoryError::Config` for an empty identifier or a slug
    /// with an empty half.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(InventoryError::Config(
                "inventory_name must not be empty".to_string(),
            ));
        }
        if let Some((name, organization)) = raw.split_once("++") {
            if name.is_empty() || organization.is_empty() {
                return Err(InventoryError::Config(format!(
                    "invalid inventory slug {raw:?}, expected name++organization"
                )));
            }
            return Ok(InventoryRef::Slug {
                name: name.to_string(),
                organization: organization.to_string(),
            });
        }
        Ok(InventoryRef::Name(raw.to_string()))
    }

    /// Convert a config-file value, which must be a string or an integer
    ///
    /// Integers are looked up by their decimal text like any other name.
    ///
    /// # Errors
    /// Returns `InventoryError::Config` for any other type.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::parse(&n.to_string()),
            _ => Err(invalid_inventory_type(value)),
        }
    }

    /// Query resolving this reference to a primary key
    pub fn lookup(&self) -> InventoryLookup {
        match self {
            InventoryRef::Name(name) => InventoryLookup::new(name.clone()),
            InventoryRef::Slug { name, organization } => {
                InventoryLookup::new(name.clone()).with_organization(organization.clone())
            }
        }
    }
}

fn invalid_inventory_type(value: &Value) -> InventoryError {
    InventoryError::Config(format!(
        "Invalid type for configuration option inventory_name, \
         not integer, and cannot convert to string: {value}"
    ))
}

impl fmt::Display for InventoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryRef::Name(name) => write!(f, "{name}"),
            InventoryRef::Slug { name, organization } => write!(f, "{name}++{organization}"),
        }
    }
}

/// Raw filter patterns, compiled later by `FilterSet`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub hosts: Option<String>,
    pub hostgroups: Option<String>,
    pub groups: Option<String>,
}

/// Fully resolved options for one inventory run
#[derive(Clone, PartialEq, Eq)]
pub struct Options {
    /// Base URL, always with a scheme
    pub host: String,
    pub username: String,
    pub password: String,
    pub inventory: InventoryRef,
    pub filters: FilterOptions,
    pub validate_certs: bool,
    pub include_metadata: bool,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("inventory", &self.inventory)
            .field("filters", &self.filters)
            .field("validate_certs", &self.validate_certs)
            .field("include_metadata", &self.include_metadata)
            .finish()
    }
}

impl Options {
    /// Load a source and resolve it against `lookup`
    ///
    /// # Errors
    /// See [`ConfigSource::load`] and [`Options::resolve`].
    pub fn load<F>(source: &ConfigSource, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(source.load()?, lookup)
    }

    /// Merge file settings with environment fallbacks
    ///
    /// # Errors
    /// Returns `InventoryError::Config` if a required option is missing or
    /// a value has the wrong type.
    pub fn resolve<F>(config: PluginConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = |value: Option<String>, var: &str| value.or_else(|| lookup(var));
        let required = |value: Option<String>, key: &str, var: &str| {
            fallback(value, var)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    InventoryError::Config(format!("missing required option {key} (or ${var})"))
                })
        };
        let optional =
            |value: Option<String>, var: &str| fallback(value, var).filter(|v| !v.is_empty());
        let flag = |value: Option<Flag>, key: &str, var: &str, default: bool| match value {
            Some(value) => value.resolve(key),
            None => lookup(var).map_or(Ok(default), |raw| parse_bool(key, &raw)),
        };

        let host = required(config.host, "host", env::HOST)?;
        let username = required(config.username, "username", env::USERNAME)?;
        let password = required(config.password, "password", env::PASSWORD)?;
        let inventory = match config.inventory_name {
            Some(value) => InventoryRef::from_value(&value)?,
            None => match lookup(env::INVENTORY) {
                Some(raw) => InventoryRef::parse(&raw)?,
                None => {
                    return Err(InventoryError::Config(format!(
                        "missing required option inventory_name (or ${})",
                        env::INVENTORY
                    )));
                }
            },
        };

        Ok(Self {
            host: normalize_host(&host),
            username,
            password,
            inventory,
            filters: FilterOptions {
                hosts: optional(config.hosts_filter, env::HOSTS_FILTER),
                hostgroups: optional(config.hostgroups_filter, env::HOSTGROUPS_FILTER),
                groups: optional(config.groups_filter, env::GROUPS_FILTER),
            },
            validate_certs: flag(
                config.validate_certs,
                "validate_certs",
                env::VERIFY_SSL,
                true,
            )?,
            include_metadata: flag(
                config.include_metadata,
                "include_metadata",
                env::METADATA_ENABLED,
                false,
            )?,
        })
    }
}

/// Prefix `https://` unless the host already names http or https
pub fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
