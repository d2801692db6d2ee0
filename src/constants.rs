//! Centralized constants for the treatment plan API.
//!
//! Defaults, stored procedure names, and user-facing response messages live
//! here so nothing is scattered through the handlers.

use std::time::Duration;

// =============================================================================
// Network Defaults
// =============================================================================

/// Default address the HTTP server binds to.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Default SQL Server port.
pub const DEFAULT_MSSQL_PORT: u16 = 1433;

// =============================================================================
// Connection Pool Constants
// =============================================================================

/// Default maximum connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout as Duration.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration =
    Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS);

// =============================================================================
// Stored Procedures
// =============================================================================

/// Procedure returning the history of a patient's treatment plans.
pub const PROC_TREATMENT_PLAN_HISTORY_GET: &str = "TreatmentPlanHistoryGet";

/// Procedure persisting a treatment plan and its per-tooth rows.
pub const PROC_TREATMENT_PLAN_SAVE: &str = "TreatmentPlanSave";

/// Server-side table type backing the `TreatmentData` table-valued parameter.
pub const TREATMENT_DATA_TABLE_TYPE: &str = "TREATMENTTYPE";

/// Name of the table-valued parameter on [`PROC_TREATMENT_PLAN_SAVE`].
pub const TREATMENT_DATA_PARAM: &str = "TreatmentData";

// =============================================================================
// Response Messages
// =============================================================================

/// Success message for the history endpoint.
pub const MSG_DATA_RETRIEVED: &str = "Data retrieved Successfully";

/// Success message for the save endpoint.
pub const MSG_DATA_SAVED: &str = "Data save Successfully";

/// Message returned with 422 validation failures.
pub const MSG_VALIDATION_ERROR: &str = "Treatment plan validation failed";

/// Generic message returned with 500 execution failures. Failure detail is
/// logged server-side, never sent to the client.
pub const MSG_SOMETHING_WENT_WRONG: &str = "Something went wrong";
