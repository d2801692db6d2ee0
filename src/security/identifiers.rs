//! SQL Server identifier escaping using bracket notation.

use crate::error::ServerError;

/// Maximum length for SQL Server identifiers.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Escape a SQL Server identifier with bracket notation.
///
/// Handles schema-qualified names (`dbo.TREATMENTTYPE` becomes
/// `[dbo].[TREATMENTTYPE]`) and embedded right brackets (doubled).
pub fn escape_identifier(identifier: &str) -> Result<String, ServerError> {
    if identifier.contains('.') {
        let parts: Vec<&str> = identifier.splitn(2, '.').collect();
        if parts.len() == 2 {
            let schema = escape_single(parts[0])?;
            let name = escape_single(parts[1])?;
            return Ok(format!("{}.{}", schema, name));
        }
    }

    escape_single(identifier)
}

fn escape_single(identifier: &str) -> Result<String, ServerError> {
    let trimmed = identifier.trim();

    if trimmed.is_empty() {
        return Err(ServerError::invalid_input("Identifier cannot be empty"));
    }
    if trimmed.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ServerError::invalid_input(format!(
            "Identifier exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }

    // Strip pre-existing outer brackets before re-escaping
    let clean = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    Ok(format!("[{}]", clean.replace(']', "]]")))
}

/// Reject identifiers containing characters that could break out of a batch.
pub fn validate_identifier(identifier: &str) -> Result<(), ServerError> {
    if identifier.is_empty() {
        return Err(ServerError::invalid_input("Identifier cannot be empty"));
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ServerError::invalid_input(format!(
            "Identifier exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }

    const FORBIDDEN: [&str; 8] = ["--", "/*", "*/", ";", "'", "\"", "\\", "\x00"];
    for pattern in &FORBIDDEN {
        if identifier.contains(pattern) {
            return Err(ServerError::invalid_input(format!(
                "Identifier contains forbidden character sequence: {}",
                pattern
            )));
        }
    }

    Ok(())
}

/// Validate and escape an identifier for safe use in SQL.
pub fn safe_identifier(identifier: &str) -> Result<String, ServerError> {
    validate_identifier(identifier)?;
    escape_identifier(identifier)
}
