//! # Router Configuration
//!
//! Settings that shape how the route table is built and how inbound paths are
//! normalized.
//!
//! ## Sources
//!
//! - [`RouterConfig::default()`] - no base path, lenient middleware, duplicate
//!   routes rejected
//! - [`RouterConfig::from_env()`] - defaults overridden by environment variables
//! - [`RouterConfig::load()`] - a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file
//!
//! ## Environment Variables
//!
//! ### `ROUTECHAIN_BASE_PATH`
//!
//! Mount prefix stripped from every inbound path before matching, e.g. `/api`.
//!
//! ### `ROUTECHAIN_STRICT_MIDDLEWARE`
//!
//! `true`/`1` turns a middleware name with no registered behavior into a build
//! error instead of a logged no-op.
//!
//! ### `ROUTECHAIN_REJECT_DUPLICATES`
//!
//! `false`/`0` accepts routes that can never match because an earlier route
//! has the same method and pattern shape.
//!
//! ## Example Configuration
//!
//! ```yaml
//! base_path: /api
//! strict_middleware: true
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::RouterError;
use crate::pattern::join_paths;

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Mount prefix stripped during path normalization
    pub base_path: String,
    /// Fail the build on unregistered middleware names
    pub strict_middleware: bool,
    /// Fail the build on routes shadowed by an identical earlier route
    pub reject_duplicates: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            strict_middleware: false,
            reject_duplicates: true,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = env::var("ROUTECHAIN_BASE_PATH") {
            config.base_path = base;
        }
        if let Some(strict) = env_flag("ROUTECHAIN_STRICT_MIDDLEWARE") {
            config.strict_middleware = strict;
        }
        if let Some(reject) = env_flag("ROUTECHAIN_REJECT_DUPLICATES") {
            config.reject_duplicates = reject;
        }
        config
    }

    /// `base_path` in canonical form: one leading slash, no trailing slash,
    /// empty for the root mount. `"api/"` becomes `/api`.
    #[must_use]
    pub fn normalized_base_path(&self) -> String {
        let joined = join_paths([self.base_path.as_str()]);
        if joined == "/" {
            String::new()
        } else {
            joined
        }
    }

    /// Load configuration from a YAML or TOML file, picked by extension.
    ///
    /// # Errors
    ///
    /// [`RouterError::Config`] when the file cannot be read, has an unknown
    /// extension, or does not deserialize.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouterError> {
        Self::load_inner(path.as_ref()).map_err(RouterError::Config)
    }

    fn load_inner(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .with_context(|| format!("invalid YAML in {}", path.display())),
            Some("toml") => {
                toml::from_str(&raw).with_context(|| format!("invalid TOML in {}", path.display()))
            }
            other => bail!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().as_deref().and_then(parse_flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.base_path, "");
        assert!(!config.strict_middleware);
        assert!(config.reject_duplicates);
    }

    #[test]
    fn test_normalized_base_path() {
        let with = |base: &str| RouterConfig {
            base_path: base.to_string(),
            ..RouterConfig::default()
        };
        assert_eq!(with("").normalized_base_path(), "");
        assert_eq!(with("/").normalized_base_path(), "");
        assert_eq!(with("api").normalized_base_path(), "/api");
        assert_eq!(with("/api/").normalized_base_path(), "/api");
        assert_eq!(with("api/v2").normalized_base_path(), "/api/v2");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "base_path: /api\nstrict_middleware: true").unwrap();
        let config = RouterConfig::load(file.path()).unwrap();
        assert_eq!(config.base_path, "/api");
        assert!(config.strict_middleware);
        assert!(config.reject_duplicates, "missing keys keep defaults");
    }

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_path = \"/app\"\nreject_duplicates = false").unwrap();
        let config = RouterConfig::load(file.path()).unwrap();
        assert_eq!(config.base_path, "/app");
        assert!(!config.reject_duplicates);
        assert!(!config.strict_middleware);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            RouterConfig::load(file.path()),
            Err(RouterError::Config(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "strict_middleware: [not, a, bool]").unwrap();
        assert!(RouterConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(RouterConfig::load("/definitely/not/here.yaml").is_err());
    }
}
