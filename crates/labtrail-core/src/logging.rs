//! Structured logging schema and field name constants for labtrail.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (pool startup, backend bootstrap) |
//! | DEBUG | Mutations, cascade step counts, config choices |
//! | TRACE | Per-item iteration, high-volume data (search hits) |

/// Subsystem originating the log event.
/// Values: "db", "mem", "search"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "projects", "attachments"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "cascade_delete", "search"
pub const OPERATION: &str = "op";

/// Entity id being operated on.
pub const RECORD_ID: &str = "record_id";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or list.
pub const RESULT_COUNT: &str = "result_count";

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
