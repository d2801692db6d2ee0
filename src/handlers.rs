//! Request handlers for the treatment plan endpoints.
//!
//! Each handler runs the same pipeline: validate the body, build the typed
//! parameter list, execute the stored procedure, shape the envelope. The
//! axum-facing functions are thin adapters over core functions returning
//! `Result`, so the flow is testable without an HTTP layer; the adapter owns
//! the two error-path side effects (status code, observer notification).

pub mod inputs;

use crate::constants::{
    MSG_DATA_RETRIEVED, MSG_DATA_SAVED, MSG_SOMETHING_WENT_WRONG, MSG_VALIDATION_ERROR,
    PROC_TREATMENT_PLAN_HISTORY_GET, PROC_TREATMENT_PLAN_SAVE, TREATMENT_DATA_PARAM,
    TREATMENT_DATA_TABLE_TYPE,
};
use crate::database::{SpCall, SpParam, SqlType, TableParam, TvpCell, TvpColumn};
use crate::error::ServerError;
use crate::response::{format_error, format_success};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inputs::{FieldError, HistoryInput, HistoryRequest, SaveInput, SaveRequest, TreatmentRow};
use serde_json::Value;

/// `POST /treatment-plan/history`
pub async fn get_treatment_plan_history(
    State(state): State<AppState>,
    Json(input): Json<HistoryInput>,
) -> Response {
    let request = match input.validate() {
        Ok(request) => request,
        Err(errors) => return validation_failure(errors),
    };

    match history(&state, request).await {
        Ok(data) => success(MSG_DATA_RETRIEVED, data),
        Err(error) => execution_failure(&state, "get_treatment_plan_history", error),
    }
}

/// `POST /treatment-plan/save`
pub async fn save_treatment_plan(
    State(state): State<AppState>,
    Json(input): Json<SaveInput>,
) -> Response {
    let request = match input.validate() {
        Ok(request) => request,
        Err(errors) => return validation_failure(errors),
    };

    match save(&state, request).await {
        Ok(data) => success(MSG_DATA_SAVED, data),
        Err(error) => execution_failure(&state, "save_treatment_plan", error),
    }
}

/// `GET /health`
pub async fn health() -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

/// Core of the history endpoint: one procedure call, first result set back.
async fn history(state: &AppState, request: HistoryRequest) -> Result<Value, ServerError> {
    let params = vec![
        SpParam::entity_id("UserId", request.user_id),
        SpParam::entity_id("PatientId", request.patient_id),
    ];

    let result = state
        .runner
        .execute(SpCall::new(PROC_TREATMENT_PLAN_HISTORY_GET, params))
        .await?;

    first_recordset_json(result)
}

/// Core of the save endpoint: full scalar list plus the table-valued
/// parameter, positionally matching the procedure signature.
async fn save(state: &AppState, request: SaveRequest) -> Result<Value, ServerError> {
    let mut table = TableParam::new(
        TREATMENT_DATA_PARAM,
        TREATMENT_DATA_TABLE_TYPE,
        treatment_data_columns(),
    );
    for row in request.treatment_data {
        table.push_row(treatment_data_row(row));
    }

    let params = vec![
        SpParam::entity_id("Id", request.id),
        SpParam::entity_id("TeethId", request.teeth_id),
        SpParam::string("TreatmentPlanName", request.treatment_plan_name),
        SpParam::string("Reason", request.reason),
        SpParam::date("StartDate", request.start_date),
        SpParam::date("EstimatedDate", request.estimated_date),
        SpParam::string("Status", request.status),
        SpParam::entity_id("PatientId", request.patient_id),
        SpParam::entity_id("DoctorId", request.doctor_id),
        SpParam::entity_id("InstituteBranchId", request.institute_branch_id),
        SpParam::entity_id("InstituteId", request.institute_id),
        SpParam::entity_id("UniqueId", request.unique_id),
        SpParam::entity_id("UserModified", request.user_modified),
        SpParam::string("Info", request.info),
        SpParam::table(table),
    ];

    let result = state
        .runner
        .execute(SpCall::new(PROC_TREATMENT_PLAN_SAVE, params))
        .await?;

    first_recordset_json(result)
}

/// Column layout of the `TREATMENTTYPE` table type. Order must match the
/// server-side definition exactly; binding is positional.
fn treatment_data_columns() -> Vec<TvpColumn> {
    vec![
        TvpColumn::new("StartDate", SqlType::Date),
        TvpColumn::new("EndDate", SqlType::Date),
        TvpColumn::new("TreatmentStatus", SqlType::VarChar(50)),
        TvpColumn::new("SelectedTeethPath", SqlType::NVarCharMax),
        TvpColumn::new("TeethUpSelectedPath", SqlType::NVarCharMax),
        TvpColumn::new("TeethSideSelectedPath", SqlType::NVarCharMax),
        TvpColumn::new("TeethImageFileName", SqlType::VarChar(255)),
        TvpColumn::new("DrawData", SqlType::NVarCharMax),
        TvpColumn::new("CDTCode", SqlType::VarChar(10)),
        TvpColumn::new("Info", SqlType::NVarCharMax),
    ]
}

fn treatment_data_row(row: TreatmentRow) -> Vec<TvpCell> {
    vec![
        TvpCell::date(row.start_date),
        TvpCell::date(row.end_date),
        row.treatment_status.into(),
        row.selected_teeth_path.into(),
        row.teeth_up_selected_path.into(),
        row.teeth_side_selected_path.into(),
        row.teeth_image_file_name.into(),
        row.draw_data.into(),
        row.cdt_code.into(),
        row.info.into(),
    ]
}

fn first_recordset_json(result: crate::database::SpResult) -> Result<Value, ServerError> {
    serde_json::to_value(result.into_first_recordset())
        .map_err(|e| ServerError::internal(format!("failed to serialize result set: {}", e)))
}

fn success(message: &str, data: Value) -> Response {
    (
        StatusCode::OK,
        Json(format_success("success", message, data)),
    )
        .into_response()
}

/// Validation short-circuit: 422 with per-field detail, executor untouched.
fn validation_failure(errors: Vec<FieldError>) -> Response {
    let detail = serde_json::to_value(errors).unwrap_or(Value::Null);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(format_error(
            Some(MSG_VALIDATION_ERROR),
            MSG_SOMETHING_WENT_WRONG,
            Some(detail),
        )),
    )
        .into_response()
}

/// Execution failure: generic 500 to the client, full error to the observer
/// exactly once. No failure detail leaks into the response body.
fn execution_failure(state: &AppState, operation: &str, error: ServerError) -> Response {
    state.observer.notify(operation, &error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(format_error(None, MSG_SOMETHING_WENT_WRONG, None)),
    )
        .into_response()
}
