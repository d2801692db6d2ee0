//! Stored-procedure execution.
//!
//! A call is rendered into a single T-SQL batch: table-valued parameters
//! become a declared table variable populated row by row, scalars become
//! escaped literals, and the procedure is invoked with named arguments. The
//! batch runs over a pooled connection that is released on every exit path.

use crate::database::params::{render_cell, render_scalar, SpParam, TableParam};
use crate::database::types::{ResultRow, TypeMapper};
use crate::database::ConnectionPool;
use crate::error::ServerError;
use crate::security::{safe_identifier, validate_identifier};
use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use tracing::debug;

/// A stored-procedure invocation: a name plus its ordered parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct SpCall {
    pub procedure: String,
    pub params: Vec<SpParam>,
}

impl SpCall {
    pub fn new(procedure: impl Into<String>, params: Vec<SpParam>) -> Self {
        Self {
            procedure: procedure.into(),
            params,
        }
    }
}

/// All result sets a procedure emitted, in emission order.
#[derive(Debug, Clone, Default)]
pub struct SpResult {
    pub recordsets: Vec<Vec<ResultRow>>,
}

impl SpResult {
    /// The first result set, or an empty one if the procedure emitted none.
    pub fn into_first_recordset(self) -> Vec<ResultRow> {
        self.recordsets.into_iter().next().unwrap_or_default()
    }
}

/// Seam between the request handlers and SQL Server.
///
/// Handlers only ever see this trait; tests substitute a recording mock.
#[async_trait]
pub trait ProcedureRunner: Send + Sync {
    async fn execute(&self, call: SpCall) -> Result<SpResult, ServerError>;
}

/// Render a call into one executable T-SQL batch.
///
/// Fails with the marshal taxonomy when a value is incompatible with its
/// declared kind or a row's length disagrees with the declared columns.
pub fn render_batch(call: &SpCall) -> Result<String, ServerError> {
    let procedure = safe_identifier(&call.procedure)?;

    let mut declarations = String::new();
    let mut args: Vec<String> = Vec::new();

    for param in &call.params {
        validate_identifier(param.name())?;
        match param {
            SpParam::Table(table) => {
                declarations.push_str(&render_table_declaration(table)?);
                args.push(format!("@{} = @{}", table.name, table.name));
            }
            scalar => {
                args.push(format!("@{} = {}", scalar.name(), render_scalar(scalar)?));
            }
        }
    }

    if args.is_empty() {
        Ok(format!("{}EXEC {};", declarations, procedure))
    } else {
        Ok(format!("{}EXEC {} {};", declarations, procedure, args.join(", ")))
    }
}

/// Declare and populate the table variable backing a table-valued parameter.
fn render_table_declaration(table: &TableParam) -> Result<String, ServerError> {
    let type_name = safe_identifier(&table.type_name)?;
    let mut sql = format!("DECLARE @{} {};\n", table.name, type_name);

    if table.rows.is_empty() {
        return Ok(sql);
    }

    let column_list: Vec<String> = table
        .columns
        .iter()
        .map(|c| safe_identifier(&c.name))
        .collect::<Result<_, _>>()?;

    let mut value_rows: Vec<String> = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        if row.len() != table.columns.len() {
            return Err(ServerError::marshal(format!(
                "row {} of @{} has {} values, table type {} declares {} columns",
                index,
                table.name,
                row.len(),
                table.type_name,
                table.columns.len()
            )));
        }
        let cells: Vec<String> = table
            .columns
            .iter()
            .zip(row)
            .map(|(column, cell)| render_cell(column, cell))
            .collect::<Result<_, _>>()?;
        value_rows.push(format!("({})", cells.join(", ")));
    }

    sql.push_str(&format!(
        "INSERT INTO @{} ({}) VALUES {};\n",
        table.name,
        column_list.join(", "),
        value_rows.join(", ")
    ));
    Ok(sql)
}

/// Executes stored procedures against SQL Server through the bb8 pool.
#[derive(Clone)]
pub struct MssqlRunner {
    pool: ConnectionPool,
}

impl MssqlRunner {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcedureRunner for MssqlRunner {
    async fn execute(&self, call: SpCall) -> Result<SpResult, ServerError> {
        let batch = render_batch(&call)?;

        debug!(
            procedure = %call.procedure,
            params = call.params.len(),
            "executing stored procedure"
        );

        // The pool guard returns the connection on drop, including on error.
        let mut conn = self.pool.get().await?;
        let mut stream = conn.simple_query(&batch).await?;

        // Each Metadata item opens the next result set; rows follow it.
        let mut recordsets: Vec<Vec<ResultRow>> = Vec::new();
        while let Some(item) = stream.try_next().await? {
            match item {
                tiberius::QueryItem::Metadata(_) => recordsets.push(Vec::new()),
                tiberius::QueryItem::Row(row) => {
                    if recordsets.is_empty() {
                        recordsets.push(Vec::new());
                    }
                    if let Some(current) = recordsets.last_mut() {
                        current.push(TypeMapper::extract_row(&row));
                    }
                }
            }
        }

        debug!(
            procedure = %call.procedure,
            recordsets = recordsets.len(),
            rows = recordsets.first().map(|r| r.len()).unwrap_or(0),
            "stored procedure completed"
        );

        Ok(SpResult { recordsets })
    }
}
