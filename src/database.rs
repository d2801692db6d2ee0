//! Database connectivity and stored-procedure execution.

mod connection;
pub mod params;
mod procedure;
pub mod types;

pub use connection::{create_pool, ConnectionPool};
pub use params::{SpParam, SqlType, TableParam, TvpCell, TvpColumn};
pub use procedure::{render_batch, MssqlRunner, ProcedureRunner, SpCall, SpResult};
pub use types::{ResultRow, SqlValue, TypeMapper};
