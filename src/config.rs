use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{EmpcheckError, Result};

/// Environment variable selecting the active profile.
pub const PROFILE_ENV_VAR: &str = "EMPCHECK_PROFILE";

/// Message shown to end users when the production profile hides the
/// driver-level connection error.
pub const GENERIC_CONNECTION_MESSAGE: &str =
    "Database connection failed. Please try again later.";

/// A named configuration variant selecting credential defaults and the
/// error-visibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Production,
}

impl Profile {
    /// Parses a profile name as given on the command line or in the
    /// environment.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim() {
            "development" => Ok(Profile::Development),
            "production" => Ok(Profile::Production),
            other => Err(EmpcheckError::Config(format!(
                "unknown profile '{}' (expected 'development' or 'production')",
                other
            ))),
        }
    }

    /// Resolves the profile from `EMPCHECK_PROFILE`, defaulting to
    /// development when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match env::var(PROFILE_ENV_VAR) {
            Ok(name) => Profile::from_name(&name),
            Err(_) => Ok(Profile::Development),
        }
    }

    /// Whether driver-level connection error text may appear on the
    /// rendered page. Production keeps it in the log sink only.
    pub fn surfaces_driver_errors(self) -> bool {
        matches!(self, Profile::Development)
    }

    /// The user-facing text for a failed connection attempt, given the
    /// full error detail.
    pub fn user_message(self, detail: &str) -> String {
        if self.surfaces_driver_errors() {
            detail.to_string()
        } else {
            GENERIC_CONNECTION_MESSAGE.to_string()
        }
    }

    /// Default `tracing` filter directive for this profile. Overridable
    /// with `EMPCHECK_LOG`.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Profile::Development => "debug",
            Profile::Production => "warn",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Production => "production",
        }
    }
}

/// Immutable application configuration, constructed once at startup and
/// passed explicitly to everything that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub app_name: String,
    pub app_version: String,
    pub timezone: String,
}

/// The recognized configuration file options. Anything else is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    app_name: Option<String>,
    app_version: Option<String>,
    timezone: Option<String>,
}

impl Config {
    /// Built-in defaults for the given profile, mirroring the two
    /// deployment environments of the Employee Management System.
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Development => Config {
                profile,
                host: "localhost".to_string(),
                port: 3306,
                user: "root".to_string(),
                password: String::new(),
                database: "php_employee_management".to_string(),
                app_name: "Employee Management System".to_string(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                timezone: "Asia/Jakarta".to_string(),
            },
            Profile::Production => Config {
                profile,
                host: "localhost".to_string(),
                port: 3306,
                user: "empuser".to_string(),
                password: "SecurePass123!".to_string(),
                database: "php_employee_management".to_string(),
                app_name: "Employee Management System".to_string(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                timezone: "UTC".to_string(),
            },
        }
    }

    /// Loads the configuration for a profile, applying overrides from a
    /// TOML file when one is given or found at the default location.
    ///
    /// An explicitly named file must exist and parse; the default file is
    /// optional and silently skipped when absent.
    pub fn load(profile: Profile, path: Option<&Path>) -> Result<Self> {
        let mut config = Config::for_profile(profile);
        match path {
            Some(explicit) => config.apply_file(explicit)?,
            None => {
                if let Some(default) = Config::default_path() {
                    if default.is_file() {
                        config.apply_file(&default)?;
                    }
                }
            }
        }
        Ok(config)
    }

    /// The per-user default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("empcheck").join("config.toml"))
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            EmpcheckError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            EmpcheckError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        self.apply(file)
    }

    fn apply(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(host) = file.host {
            let (host, port) = split_host_port(&host)?;
            self.host = host;
            if let Some(port) = port {
                self.port = port;
            }
        }
        if let Some(user) = file.user {
            self.user = user;
        }
        if let Some(password) = file.password {
            self.password = password;
        }
        if let Some(database) = file.database {
            self.database = database;
        }
        if let Some(app_name) = file.app_name {
            self.app_name = app_name;
        }
        if let Some(app_version) = file.app_version {
            self.app_version = app_version;
        }
        if let Some(timezone) = file.timezone {
            self.timezone = timezone;
        }
        Ok(())
    }
}

/// Splits an optional `:port` suffix off a host option. A bare hostname
/// keeps the profile's default port.
fn split_host_port(value: &str) -> Result<(String, Option<u16>)> {
    match value.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port.parse::<u16>().map_err(|_| {
                EmpcheckError::Config(format!("invalid port in host option '{}'", value))
            })?;
            Ok((host.to_string(), Some(port)))
        }
        _ => Ok((value.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
host = "db.internal:3307"
user = "checker"
password = "hunter2"
database = "employees"
app_name = "Employee Management System"
app_version = "2.0.0"
timezone = "Europe/Stockholm"
"#;

    #[test]
    fn test_profile_from_name() {
        assert_eq!(
            Profile::from_name("development").unwrap(),
            Profile::Development
        );
        assert_eq!(
            Profile::from_name(" production ").unwrap(),
            Profile::Production
        );
        assert!(Profile::from_name("staging").is_err());
    }

    #[test]
    fn test_profile_defaults() {
        let dev = Config::for_profile(Profile::Development);
        assert_eq!(dev.user, "root");
        assert_eq!(dev.password, "");
        assert_eq!(dev.timezone, "Asia/Jakarta");

        let prod = Config::for_profile(Profile::Production);
        assert_eq!(prod.user, "empuser");
        assert_eq!(prod.timezone, "UTC");
        assert_eq!(prod.database, dev.database);
    }

    #[test]
    fn test_error_visibility_policy() {
        let detail = "Access denied for user 'root'@'localhost'";
        assert_eq!(Profile::Development.user_message(detail), detail);

        let shown = Profile::Production.user_message(detail);
        assert_eq!(shown, GENERIC_CONNECTION_MESSAGE);
        assert!(!shown.contains("Access denied"));
    }

    #[test]
    fn test_apply_sample_config() {
        let file: ConfigFile =
            toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        let mut config = Config::for_profile(Profile::Development);
        config.apply(file).unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 3307);
        assert_eq!(config.user, "checker");
        assert_eq!(config.database, "employees");
        assert_eq!(config.app_version, "2.0.0");
        assert_eq!(config.timezone, "Europe/Stockholm");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let file: ConfigFile = toml::from_str("user = \"audit\"").unwrap();
        let mut config = Config::for_profile(Profile::Production);
        config.apply(file).unwrap();

        assert_eq!(config.user, "audit");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.password, "SecurePass123!");
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result: std::result::Result<ConfigFile, _> =
            toml::from_str("pool_size = 10");
        assert!(result.is_err());
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("localhost").unwrap(),
            ("localhost".to_string(), None)
        );
        assert_eq!(
            split_host_port("db:3307").unwrap(),
            ("db".to_string(), Some(3307))
        );
        assert!(split_host_port("db:notaport").is_err());
    }
}
