//! Diagnostic probe.
//!
//! Runs the fixed diagnostic sequence against the configured database:
//! open a connection, read the server version, count the `employee`
//! table, fetch a bounded sample, and release the connection. The result
//! is a transient [`DiagnosticReport`] consumed by the page renderer and
//! discarded afterwards.

use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::db::connection::ConnectionHandle;
use crate::core::db::query::{DataSource, EmployeeRow};

/// The table the diagnostic queries run against.
pub const EMPLOYEE_TABLE: &str = "employee";

/// How many sample rows the page shows.
pub const SAMPLE_LIMIT: usize = 3;

/// Oldest server version the application supports.
pub const MIN_SERVER_VERSION: (u64, u64, u64) = (5, 7, 0);
pub const MIN_SERVER_VERSION_TEXT: &str = "5.7.0";

/// Name of the compiled-in database driver, reported on the page.
pub const DRIVER_NAME: &str = "mysql_async";

/// Outcome of the connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The connection succeeded; the page lists where it went.
    Connected {
        host: String,
        database: String,
        user: String,
    },
    /// The connection failed. `message` is already filtered by the
    /// active profile's visibility policy.
    Failed { message: String },
}

/// Result of comparing the reported server version to the minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    pub reported: String,
    pub minimum: &'static str,
    pub ok: bool,
}

/// Render-only summary of the environment and connection checks.
/// Created per run, never persisted.
#[derive(Debug)]
pub struct DiagnosticReport {
    pub app_name: String,
    pub app_version: String,
    pub driver: &'static str,
    pub timezone: String,
    pub connection: ConnectionStatus,
    /// Present only when the connection and the version query succeeded.
    pub server_version: Option<VersionCheck>,
    /// Present only when the count query succeeded.
    pub employee_count: Option<u64>,
    /// Populated only after a successful count query.
    pub sample_rows: Vec<EmployeeRow>,
    /// User-facing text of a failed diagnostic query, if any.
    pub query_error: Option<String>,
}

impl DiagnosticReport {
    fn new(config: &Config, connection: ConnectionStatus) -> Self {
        DiagnosticReport {
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
            driver: DRIVER_NAME,
            timezone: config.timezone.clone(),
            connection,
            server_version: None,
            employee_count: None,
            sample_rows: Vec::new(),
            query_error: None,
        }
    }

    fn connected(config: &Config) -> Self {
        DiagnosticReport::new(
            config,
            ConnectionStatus::Connected {
                host: config.host.clone(),
                database: config.database.clone(),
                user: config.user.clone(),
            },
        )
    }

    fn connection_failed(config: &Config, message: String) -> Self {
        DiagnosticReport::new(config, ConnectionStatus::Failed { message })
    }

    pub fn connection_ok(&self) -> bool {
        matches!(self.connection, ConnectionStatus::Connected { .. })
    }
}

/// Runs the full diagnostic sequence for `config`.
///
/// Connection failure is recoverable here: it produces a report with a
/// failure banner instead of an error. The handle is released on every
/// exit path before the report is returned.
pub async fn run(config: &Config) -> DiagnosticReport {
    info!(profile = config.profile.name(), "Running system check");
    match ConnectionHandle::open(config).await {
        Ok(mut handle) => {
            let report = collect(&mut handle, config).await;
            handle.close().await;
            report
        }
        Err(err) => {
            error!(error = %err, "Database connection failed");
            DiagnosticReport::connection_failed(config, config.profile.user_message(&err.to_string()))
        }
    }
}

/// Assembles the report from an open data source.
///
/// Query failures are folded into the report; nothing here halts the
/// run. The sample query is attempted only after a successful count.
pub async fn collect<S: DataSource>(source: &mut S, config: &Config) -> DiagnosticReport {
    let mut report = DiagnosticReport::connected(config);

    match source.server_version().await {
        Ok(reported) => {
            let ok = meets_minimum(&reported, MIN_SERVER_VERSION);
            report.server_version = Some(VersionCheck {
                reported,
                minimum: MIN_SERVER_VERSION_TEXT,
                ok,
            });
        }
        Err(err) => {
            warn!(error = %err, "Server version query failed");
        }
    }

    match source.count_rows(EMPLOYEE_TABLE).await {
        Ok(count) => {
            report.employee_count = Some(count);
            match source.sample_rows(EMPLOYEE_TABLE, SAMPLE_LIMIT).await {
                Ok(rows) => report.sample_rows = rows,
                Err(err) => {
                    warn!(error = %err, "Sample query failed");
                    report.query_error = Some(err.to_string());
                }
            }
        }
        Err(err) => {
            warn!(error = %err, "Count query failed");
            report.query_error = Some(err.to_string());
        }
    }

    report
}

/// Parses the numeric core of a server version string, e.g.
/// `8.0.36-log` → `(8, 0, 36)`. Missing components default to zero.
pub fn parse_version(reported: &str) -> Option<(u64, u64, u64)> {
    let core = reported.split('-').next()?;
    let mut parts = core.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = match parts.next() {
        Some(p) => p.trim().parse().ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(p) => p.trim().parse().ok()?,
        None => 0,
    };
    Some((major, minor, patch))
}

/// Whether `reported` satisfies the `minimum` version. Unparseable
/// strings fail the gate rather than panic.
pub fn meets_minimum(reported: &str, minimum: (u64, u64, u64)) -> bool {
    parse_version(reported).map_or(false, |v| v >= minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use crate::core::{EmpcheckError, Result};
    use async_trait::async_trait;

    /// Scripted stand-in for a live connection. `count` and `version`
    /// set to `None` make the corresponding query fail.
    #[derive(Default)]
    struct ScriptedSource {
        version: Option<String>,
        count: Option<u64>,
        rows: Vec<EmployeeRow>,
        sample_calls: usize,
    }

    #[async_trait]
    impl DataSource for ScriptedSource {
        async fn server_version(&mut self) -> Result<String> {
            self.version
                .clone()
                .ok_or_else(|| EmpcheckError::Query("version unavailable".to_string()))
        }

        async fn count_rows(&mut self, table: &str) -> Result<u64> {
            self.count
                .ok_or_else(|| EmpcheckError::Query(format!("Table '{}' doesn't exist", table)))
        }

        async fn sample_rows(&mut self, _table: &str, limit: usize) -> Result<Vec<EmployeeRow>> {
            self.sample_calls += 1;
            Ok(self.rows.iter().take(limit).cloned().collect())
        }
    }

    fn employee(id: i64) -> EmployeeRow {
        EmployeeRow {
            id,
            name: format!("Employee {}", id),
            email: format!("employee{}@example.com", id),
        }
    }

    fn dev_config() -> Config {
        Config::for_profile(Profile::Development)
    }

    #[tokio::test]
    async fn test_five_rows_sample_limited_to_three() {
        let mut source = ScriptedSource {
            version: Some("8.0.36-log".to_string()),
            count: Some(5),
            rows: (1..=5).map(employee).collect(),
            ..Default::default()
        };

        let report = collect(&mut source, &dev_config()).await;

        assert!(report.connection_ok());
        assert_eq!(report.employee_count, Some(5));
        assert_eq!(report.sample_rows.len(), 3);
        // The sample preserves engine order: the first three rows.
        assert_eq!(
            report.sample_rows,
            vec![employee(1), employee(2), employee(3)]
        );
        assert!(report.query_error.is_none());
        assert!(report.server_version.unwrap().ok);
    }

    #[tokio::test]
    async fn test_missing_table_skips_sample_query() {
        let mut source = ScriptedSource {
            version: Some("8.0.36".to_string()),
            count: None,
            rows: vec![employee(1)],
            ..Default::default()
        };

        let report = collect(&mut source, &dev_config()).await;

        // Connection succeeded, the diagnostic query did not.
        assert!(report.connection_ok());
        assert_eq!(report.employee_count, None);
        assert!(report.sample_rows.is_empty());
        let message = report.query_error.expect("expected a query error");
        assert!(message.contains("doesn't exist"));
        // Dependency ordering: the sample query must never run after a
        // failed count.
        assert_eq!(source.sample_calls, 0);
    }

    #[tokio::test]
    async fn test_empty_table_is_not_an_error() {
        let mut source = ScriptedSource {
            version: Some("8.0.36".to_string()),
            count: Some(0),
            ..Default::default()
        };

        let report = collect(&mut source, &dev_config()).await;

        assert_eq!(report.employee_count, Some(0));
        assert!(report.sample_rows.is_empty());
        assert!(report.query_error.is_none());
        assert_eq!(source.sample_calls, 1);
    }

    #[tokio::test]
    async fn test_version_query_failure_does_not_block_count() {
        let mut source = ScriptedSource {
            version: None,
            count: Some(2),
            rows: vec![employee(1), employee(2)],
            ..Default::default()
        };

        let report = collect(&mut source, &dev_config()).await;

        assert!(report.server_version.is_none());
        assert_eq!(report.employee_count, Some(2));
        assert_eq!(report.sample_rows.len(), 2);
    }

    #[tokio::test]
    async fn test_old_server_fails_version_gate() {
        let mut source = ScriptedSource {
            version: Some("5.6.4".to_string()),
            count: Some(0),
            ..Default::default()
        };

        let report = collect(&mut source, &dev_config()).await;
        let check = report.server_version.unwrap();
        assert!(!check.ok);
        assert_eq!(check.minimum, "5.7.0");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("8.0.36-log"), Some((8, 0, 36)));
        assert_eq!(parse_version("5.7.0"), Some((5, 7, 0)));
        assert_eq!(parse_version("8"), Some((8, 0, 0)));
        assert_eq!(parse_version("10.4"), Some((10, 4, 0)));
        assert_eq!(parse_version("garbage"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_meets_minimum() {
        assert!(meets_minimum("5.7.0", MIN_SERVER_VERSION));
        assert!(meets_minimum("8.0.36-log", MIN_SERVER_VERSION));
        assert!(!meets_minimum("5.6.51", MIN_SERVER_VERSION));
        assert!(!meets_minimum("not-a-version", MIN_SERVER_VERSION));
    }
}
