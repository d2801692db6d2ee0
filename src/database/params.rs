//! Typed stored-procedure parameter builders.
//!
//! Each builder wraps a field name and a raw value into a tagged descriptor.
//! Construction is pure and order-preserving; no value validation happens
//! here. Dates in particular are carried as raw strings and only parsed when
//! the call is rendered, so an invalid date surfaces as an execution-time
//! failure rather than being rejected (or nulled) up front.

use crate::error::ServerError;
use chrono::{DateTime, NaiveDate};

/// A typed parameter descriptor, dispatched by kind in the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum SpParam {
    /// Integer entity identifier.
    Id { name: String, value: i64 },
    /// Unicode string; `None` binds SQL `NULL`.
    Str { name: String, value: Option<String> },
    /// Date carried as its raw wire string, parsed at bind time.
    Date { name: String, value: String },
    /// Table-valued parameter.
    Table(TableParam),
}

impl SpParam {
    /// Build an entity id parameter.
    pub fn entity_id(name: impl Into<String>, value: i64) -> Self {
        Self::Id {
            name: name.into(),
            value,
        }
    }

    /// Build a string parameter.
    pub fn string(name: impl Into<String>, value: impl Into<Option<String>>) -> Self {
        Self::Str {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build a date parameter from the raw request string.
    pub fn date(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Date {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build a table-valued parameter.
    pub fn table(table: TableParam) -> Self {
        Self::Table(table)
    }

    /// The parameter name as it appears in the procedure signature.
    pub fn name(&self) -> &str {
        match self {
            Self::Id { name, .. } | Self::Str { name, .. } | Self::Date { name, .. } => name,
            Self::Table(t) => &t.name,
        }
    }
}

/// Declaration of a table-valued parameter.
///
/// `columns` must match the server-side table type definition exactly, in
/// order: binding is positional in both dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TableParam {
    /// Parameter name in the procedure signature.
    pub name: String,
    /// Server-side table type, e.g. `TREATMENTTYPE`.
    pub type_name: String,
    /// Ordered column definitions.
    pub columns: Vec<TvpColumn>,
    /// Ordered rows of ordered cells.
    pub rows: Vec<Vec<TvpCell>>,
}

impl TableParam {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        columns: Vec<TvpColumn>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append one row. Input order is preserved.
    pub fn push_row(&mut self, row: Vec<TvpCell>) {
        self.rows.push(row);
    }
}

/// One column of a table type.
#[derive(Debug, Clone, PartialEq)]
pub struct TvpColumn {
    pub name: String,
    pub sql_type: SqlType,
}

impl TvpColumn {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// Underlying scalar type of a table-type column, driving literal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Date,
    Int,
    BigInt,
    VarChar(u32),
    NVarChar(u32),
    NVarCharMax,
}

/// One cell of a table-valued parameter row.
#[derive(Debug, Clone, PartialEq)]
pub enum TvpCell {
    Null,
    Str(String),
    /// Raw date string; parsed against the column type at render time.
    Date(String),
    Int(i64),
}

impl TvpCell {
    /// Build a date cell from the raw request string.
    pub fn date(value: impl Into<String>) -> Self {
        Self::Date(value.into())
    }
}

impl From<Option<String>> for TvpCell {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Self::Str(s),
            None => Self::Null,
        }
    }
}

impl From<String> for TvpCell {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Parse a request date string into a `NaiveDate`.
///
/// Accepts plain `YYYY-MM-DD` or a full RFC 3339 timestamp (the clients send
/// both). Anything else is a marshaling failure.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ServerError> {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    Err(ServerError::marshal(format!(
        "invalid date '{}' for {}",
        value, field
    )))
}

/// Render a string as an escaped T-SQL literal.
fn quote(value: &str, unicode: bool) -> String {
    let escaped = value.replace('\'', "''");
    if unicode {
        format!("N'{}'", escaped)
    } else {
        format!("'{}'", escaped)
    }
}

/// Render a scalar parameter value as a T-SQL literal.
pub(crate) fn render_scalar(param: &SpParam) -> Result<String, ServerError> {
    match param {
        SpParam::Id { value, .. } => Ok(value.to_string()),
        SpParam::Str { value, .. } => Ok(match value {
            Some(s) => quote(s, true),
            None => "NULL".to_string(),
        }),
        SpParam::Date { name, value } => {
            let date = parse_date(name, value)?;
            Ok(format!("'{}'", date.format("%Y-%m-%d")))
        }
        SpParam::Table(_) => Err(ServerError::internal(
            "table parameter rendered as scalar".to_string(),
        )),
    }
}

/// Render one cell against its declared column type.
pub(crate) fn render_cell(column: &TvpColumn, cell: &TvpCell) -> Result<String, ServerError> {
    match (column.sql_type, cell) {
        (_, TvpCell::Null) => Ok("NULL".to_string()),
        (SqlType::Date, TvpCell::Date(raw)) | (SqlType::Date, TvpCell::Str(raw)) => {
            let date = parse_date(&column.name, raw)?;
            Ok(format!("'{}'", date.format("%Y-%m-%d")))
        }
        (SqlType::Int, TvpCell::Int(v)) | (SqlType::BigInt, TvpCell::Int(v)) => Ok(v.to_string()),
        (SqlType::VarChar(_), TvpCell::Str(s)) => Ok(quote(s, false)),
        (SqlType::NVarChar(_), TvpCell::Str(s)) | (SqlType::NVarCharMax, TvpCell::Str(s)) => {
            Ok(quote(s, true))
        }
        (sql_type, cell) => Err(ServerError::marshal(format!(
            "value {:?} is incompatible with column {} ({:?})",
            cell, column.name, sql_type
        ))),
    }
}
