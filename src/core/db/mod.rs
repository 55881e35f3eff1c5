/// Database Module
///
/// This module provides the database layer of the system check,
/// organized into focused submodules for better maintainability and
/// separation of concerns.
///
/// The layer is split into two concerns:
/// - **Connection Management** (`connection.rs`): opening and releasing
///   the single MySQL session
/// - **Query Execution** (`query.rs`): the diagnostic query set and the
///   `DataSource` seam it is exposed through
///
/// All database operations use the standardized `EmpcheckError` type for
/// consistent error propagation.
pub mod connection;
pub mod query;

pub use connection::*;
pub use query::*;
