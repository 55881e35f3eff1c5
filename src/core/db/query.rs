/// Query Execution Module
///
/// This module provides the diagnostic query set run over an open
/// connection: server version, row count, and a bounded sample of the
/// `employee` table.
use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use tracing::debug;

use super::connection::ConnectionHandle;
use crate::core::{EmpcheckError, Result};

/// One record of the `employee` table, as rendered on the diagnostic
/// page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// The diagnostic operations available once a connection is open.
///
/// The report assembly is written against this trait so it can be
/// exercised without a live server; `ConnectionHandle` is the only
/// production implementation.
#[async_trait]
pub trait DataSource {
    /// Reports the server version string, e.g. `8.0.36-log`.
    async fn server_version(&mut self) -> Result<String>;

    /// Counts the rows of `table`. Fails with a query error when the
    /// table does not exist.
    async fn count_rows(&mut self, table: &str) -> Result<u64>;

    /// Fetches up to `limit` rows of `table`, in whatever order the
    /// storage engine yields them. An empty table yields an empty
    /// vector, not an error.
    async fn sample_rows(&mut self, table: &str, limit: usize) -> Result<Vec<EmployeeRow>>;
}

#[async_trait]
impl DataSource for ConnectionHandle {
    async fn server_version(&mut self) -> Result<String> {
        debug!("Querying server version");
        let conn = self.conn_mut()?;
        let version: Option<String> = conn
            .query_first("SELECT VERSION()")
            .await
            .map_err(query_error)?;
        version.ok_or_else(|| EmpcheckError::Query("server did not report a version".to_string()))
    }

    async fn count_rows(&mut self, table: &str) -> Result<u64> {
        let statement = format!("SELECT COUNT(*) FROM {}", table);
        debug!(query = %statement, "Executing count query");
        let conn = self.conn_mut()?;
        let count: Option<u64> = conn.query_first(&statement).await.map_err(query_error)?;
        count.ok_or_else(|| {
            EmpcheckError::Query(format!("count query for '{}' returned no rows", table))
        })
    }

    async fn sample_rows(&mut self, table: &str, limit: usize) -> Result<Vec<EmployeeRow>> {
        // No ORDER BY: the sample shows whatever the engine yields first.
        let statement = format!("SELECT id, name, email FROM {} LIMIT {}", table, limit);
        debug!(query = %statement, "Executing sample query");
        let conn = self.conn_mut()?;
        let rows = conn
            .query_map(&statement, |(id, name, email)| EmployeeRow { id, name, email })
            .await
            .map_err(query_error)?;
        Ok(rows)
    }
}

fn query_error(err: mysql_async::Error) -> EmpcheckError {
    EmpcheckError::Query(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_row_equality() {
        let row = EmployeeRow {
            id: 1,
            name: "Budi Santoso".to_string(),
            email: "budi@example.com".to_string(),
        };
        assert_eq!(row, row.clone());
    }
}
