//! Request body types and required-field validation.
//!
//! Bodies deserialize into all-optional input types so a missing field
//! becomes a structured per-field error instead of a serde rejection. The
//! `validate` methods produce the concrete request types the handlers work
//! with; past that point every required field is present by construction.

use serde::{Deserialize, Serialize};

/// One failed validation rule, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is required", field);
        Self { field, message }
    }
}

fn require<T>(errors: &mut Vec<FieldError>, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.push(FieldError::required(field));
    }
    value
}

// =============================================================================
// Treatment plan history
// =============================================================================

/// Raw body of `POST /treatment-plan/history`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryInput {
    pub user_id: Option<i64>,
    pub patient_id: Option<i64>,
}

/// Validated history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub user_id: i64,
    pub patient_id: i64,
}

impl HistoryInput {
    pub fn validate(self) -> Result<HistoryRequest, Vec<FieldError>> {
        let mut errors = Vec::new();
        let user_id = require(&mut errors, "UserId", self.user_id);
        let patient_id = require(&mut errors, "PatientId", self.patient_id);

        match (user_id, patient_id) {
            (Some(user_id), Some(patient_id)) if errors.is_empty() => Ok(HistoryRequest {
                user_id,
                patient_id,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Treatment plan save
// =============================================================================

/// Raw body of `POST /treatment-plan/save`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveInput {
    pub id: Option<i64>,
    pub teeth_id: Option<i64>,
    pub treatment_plan_name: Option<String>,
    pub reason: Option<String>,
    pub start_date: Option<String>,
    pub estimated_date: Option<String>,
    pub status: Option<String>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub institute_branch_id: Option<i64>,
    pub institute_id: Option<i64>,
    pub unique_id: Option<i64>,
    pub info: Option<String>,
    pub user_modified: Option<i64>,
    pub treatment_data: Option<Vec<TreatmentRowInput>>,
}

/// One raw row of the `TreatmentData` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TreatmentRowInput {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub treatment_status: Option<String>,
    pub selected_teeth_path: Option<String>,
    pub teeth_up_selected_path: Option<String>,
    pub teeth_side_selected_path: Option<String>,
    pub teeth_image_file_name: Option<String>,
    pub draw_data: Option<String>,
    #[serde(rename = "CDTCode")]
    pub cdt_code: Option<String>,
    pub info: Option<String>,
}

/// Validated save request. `reason` and `info` stay optional (free-form)
/// and bind NULL when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub id: i64,
    pub teeth_id: i64,
    pub treatment_plan_name: String,
    pub reason: Option<String>,
    pub start_date: String,
    pub estimated_date: String,
    pub status: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub institute_branch_id: i64,
    pub institute_id: i64,
    pub unique_id: i64,
    pub info: Option<String>,
    pub user_modified: i64,
    pub treatment_data: Vec<TreatmentRow>,
}

/// One validated row destined for the table-valued parameter. Dates stay as
/// raw strings here; conversion happens when the parameter list is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentRow {
    pub start_date: String,
    pub end_date: String,
    pub treatment_status: String,
    pub selected_teeth_path: Option<String>,
    pub teeth_up_selected_path: Option<String>,
    pub teeth_side_selected_path: Option<String>,
    pub teeth_image_file_name: Option<String>,
    pub draw_data: Option<String>,
    pub cdt_code: Option<String>,
    pub info: Option<String>,
}

impl SaveInput {
    pub fn validate(self) -> Result<SaveRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let id = require(&mut errors, "Id", self.id);
        let teeth_id = require(&mut errors, "TeethId", self.teeth_id);
        let treatment_plan_name =
            require(&mut errors, "TreatmentPlanName", self.treatment_plan_name);
        let start_date = require(&mut errors, "StartDate", self.start_date);
        let estimated_date = require(&mut errors, "EstimatedDate", self.estimated_date);
        let status = require(&mut errors, "Status", self.status);
        let patient_id = require(&mut errors, "PatientId", self.patient_id);
        let doctor_id = require(&mut errors, "DoctorId", self.doctor_id);
        let institute_branch_id =
            require(&mut errors, "InstituteBranchId", self.institute_branch_id);
        let institute_id = require(&mut errors, "InstituteId", self.institute_id);
        let unique_id = require(&mut errors, "UniqueId", self.unique_id);
        let user_modified = require(&mut errors, "UserModified", self.user_modified);
        let treatment_data = require(&mut errors, "TreatmentData", self.treatment_data);

        let rows = treatment_data
            .map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .filter_map(|(index, row)| row.validate(index, &mut errors))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if !errors.is_empty() {
            return Err(errors);
        }

        // Every required Option is Some once errors is empty.
        match (
            id,
            teeth_id,
            treatment_plan_name,
            start_date,
            estimated_date,
            status,
            patient_id,
            doctor_id,
            institute_branch_id,
            institute_id,
            unique_id,
            user_modified,
        ) {
            (
                Some(id),
                Some(teeth_id),
                Some(treatment_plan_name),
                Some(start_date),
                Some(estimated_date),
                Some(status),
                Some(patient_id),
                Some(doctor_id),
                Some(institute_branch_id),
                Some(institute_id),
                Some(unique_id),
                Some(user_modified),
            ) => Ok(SaveRequest {
                id,
                teeth_id,
                treatment_plan_name,
                reason: self.reason,
                start_date,
                estimated_date,
                status,
                patient_id,
                doctor_id,
                institute_branch_id,
                institute_id,
                unique_id,
                info: self.info,
                user_modified,
                treatment_data: rows,
            }),
            _ => Err(errors),
        }
    }
}

impl TreatmentRowInput {
    fn validate(self, index: usize, errors: &mut Vec<FieldError>) -> Option<TreatmentRow> {
        let mut missing = false;
        let mut require_row = |field: &str, present: bool| {
            if !present {
                errors.push(FieldError::required(format!(
                    "TreatmentData[{}].{}",
                    index, field
                )));
                missing = true;
            }
        };

        require_row("StartDate", self.start_date.is_some());
        require_row("EndDate", self.end_date.is_some());
        require_row("TreatmentStatus", self.treatment_status.is_some());
        if missing {
            return None;
        }

        Some(TreatmentRow {
            start_date: self.start_date?,
            end_date: self.end_date?,
            treatment_status: self.treatment_status?,
            selected_teeth_path: self.selected_teeth_path,
            teeth_up_selected_path: self.teeth_up_selected_path,
            teeth_side_selected_path: self.teeth_side_selected_path,
            teeth_image_file_name: self.teeth_image_file_name,
            draw_data: self.draw_data,
            cdt_code: self.cdt_code,
            info: self.info,
        })
    }
}
