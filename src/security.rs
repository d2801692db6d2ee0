//! SQL identifier validation and escaping.
//!
//! Procedure names, table type names, and parameter names are spliced into
//! T-SQL batches; everything spliced goes through this module first.

mod identifiers;

pub use identifiers::{escape_identifier, safe_identifier, validate_identifier};
