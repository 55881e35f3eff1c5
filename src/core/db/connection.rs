/// Connection Management Module
///
/// This module owns the lifecycle of the single MySQL session used by the
/// system check: building driver options from the configuration, opening
/// the session, and releasing it.
use mysql_async::{Conn, OptsBuilder};
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::{EmpcheckError, Result};

/// An open, exclusively-owned database session.
///
/// The handle is binary: open until `close` is called, then closed for
/// good. `close` is idempotent and never fails; a handle that is dropped
/// without being closed is cleaned up by the driver.
#[derive(Debug)]
pub struct ConnectionHandle {
    conn: Option<Conn>,
}

impl ConnectionHandle {
    /// Opens a session using the connection parameters of `config`.
    ///
    /// # Returns
    ///
    /// A live handle, or `EmpcheckError::Connection` carrying the driver
    /// error when the server is unreachable or rejects the credentials.
    pub async fn open(config: &Config) -> Result<Self> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .tcp_port(config.port)
            .user(Some(&config.user))
            .pass(Some(&config.password))
            .db_name(Some(&config.database));

        debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            user = %config.user,
            "Opening database connection"
        );

        let conn = Conn::new(opts)
            .await
            .map_err(EmpcheckError::Connection)?;
        Ok(ConnectionHandle { conn: Some(conn) })
    }

    /// Whether the handle still owns a live session.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Releases the session. Safe to call any number of times; calls
    /// after the first are no-ops.
    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("Closing database connection");
            if let Err(e) = conn.disconnect().await {
                warn!(error = %e, "Error while closing database connection");
            }
        }
    }

    /// The live driver connection, for the query layer.
    pub(crate) fn conn_mut(&mut self) -> Result<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| EmpcheckError::Query("connection already closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    #[tokio::test]
    async fn test_open_rejects_unreachable_server() {
        let mut config = Config::for_profile(Profile::Development);
        config.host = "127.0.0.1".to_string();
        // Port 1 is never a MySQL server; the connect attempt must fail
        // with a connection error, not hang or panic.
        config.port = 1;

        let result = ConnectionHandle::open(&config).await;
        match result {
            Err(EmpcheckError::Connection(_)) => {}
            Err(other) => panic!("Expected Connection error, got {:?}", other),
            Ok(_) => panic!("Expected connection failure"),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut handle = ConnectionHandle { conn: None };
        assert!(!handle.is_open());

        // Closing an already-closed handle is a no-op, never an error.
        handle.close().await;
        handle.close().await;
        assert!(!handle.is_open());
    }

    #[tokio::test]
    async fn test_queries_fail_after_close() {
        let mut handle = ConnectionHandle { conn: None };
        match handle.conn_mut() {
            Err(EmpcheckError::Query(msg)) => {
                assert!(msg.contains("already closed"));
            }
            _ => panic!("Expected Query error"),
        }
    }
}
