//! # Treatment Plan API
//!
//! HTTP API for dental treatment plans backed by SQL Server stored
//! procedures.
//!
//! This crate provides:
//! - **Typed parameter builders**: tagged descriptors (id, string, date,
//!   table-valued) marshaled into stored-procedure calls
//! - **Stored-procedure executor**: renders a call into a single T-SQL batch
//!   over a pooled connection and collects every result set in order
//! - **Response envelopes**: the uniform `{status/error, message, data}`
//!   JSON wrapper returned on every path
//!
//! ## Architecture
//!
//! All business logic lives in the database's stored procedures; this layer
//! validates input, marshals parameters, and shapes responses. Handlers see
//! the database only through the [`database::ProcedureRunner`] seam.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod observer;
pub mod response;
pub mod security;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::ServerError;
pub use state::AppState;
