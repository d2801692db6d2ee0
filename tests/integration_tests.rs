//! Endpoint tests driving the axum router with a mock procedure runner.
//!
//! No live database: the runner seam records every call so the tests can
//! assert on procedure names, parameter order, and table-valued parameter
//! shape, while the counting observer verifies the error-path side effect.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use treatment_plan_api::database::{
    render_batch, ProcedureRunner, ResultRow, SpCall, SpParam, SpResult, SqlValue,
};
use treatment_plan_api::observer::ErrorObserver;
use treatment_plan_api::server::router;
use treatment_plan_api::{AppState, ServerError};

// =============================================================================
// Test Doubles
// =============================================================================

struct RecordingRunner {
    calls: Mutex<Vec<SpCall>>,
    fail: bool,
}

impl RecordingRunner {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn calls(&self) -> Vec<SpCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcedureRunner for RecordingRunner {
    async fn execute(&self, call: SpCall) -> Result<SpResult, ServerError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(ServerError::execution("deadlock victim"));
        }
        let mut row = ResultRow::new();
        row.insert("PlanId", SqlValue::I32(1));
        Ok(SpResult {
            recordsets: vec![vec![row], vec![]],
        })
    }
}

#[derive(Default)]
struct CountingObserver(AtomicUsize);

impl CountingObserver {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ErrorObserver for CountingObserver {
    fn notify(&self, _operation: &str, _error: &ServerError) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn test_app(runner: Arc<RecordingRunner>, observer: Arc<CountingObserver>) -> Router {
    router(AppState::with_parts(runner, observer))
}

async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn save_body() -> Value {
    json!({
        "Id": 1,
        "TeethId": 18,
        "TreatmentPlanName": "Molar restoration",
        "Reason": "Fractured cusp",
        "StartDate": "2026-01-05",
        "EstimatedDate": "2026-04-01",
        "Status": "Active",
        "PatientId": 42,
        "DoctorId": 9,
        "InstituteBranchId": 3,
        "InstituteId": 1,
        "UniqueId": 77,
        "Info": "",
        "UserModified": 7,
        "TreatmentData": [
            {
                "StartDate": "2026-01-05",
                "EndDate": "2026-02-01",
                "TreatmentStatus": "Planned",
                "SelectedTeethPath": "m18",
                "TeethUpSelectedPath": "u18",
                "TeethSideSelectedPath": "s18",
                "TeethImageFileName": "18.png",
                "DrawData": "{\"strokes\":[]}",
                "CDTCode": "D2740",
                "Info": "crown"
            },
            {
                "EndDate": "2026-03-01",
                "StartDate": "2026-02-01",
                "TreatmentStatus": "Planned",
                "CDTCode": "D2391"
            }
        ]
    })
}

// =============================================================================
// History Endpoint
// =============================================================================

#[tokio::test]
async fn history_returns_first_recordset_in_success_envelope() {
    let runner = RecordingRunner::succeeding();
    let app = test_app(runner.clone(), Arc::default());

    let response = post_json(
        app,
        "/treatment-plan/history",
        json!({"UserId": 7, "PatientId": 42}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "status": "success",
            "message": "Data retrieved Successfully",
            "data": [{"PlanId": 1}],
        })
    );

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].procedure, "TreatmentPlanHistoryGet");
    assert_eq!(
        calls[0].params,
        vec![
            SpParam::entity_id("UserId", 7),
            SpParam::entity_id("PatientId", 42),
        ]
    );
}

#[tokio::test]
async fn history_missing_field_short_circuits_with_422() {
    let runner = RecordingRunner::succeeding();
    let observer: Arc<CountingObserver> = Arc::default();
    let app = test_app(runner.clone(), observer.clone());

    let response = post_json(app, "/treatment-plan/history", json!({"UserId": 7})).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["data"][0]["field"], json!("PatientId"));

    // Executor never invoked, observer never notified
    assert!(runner.calls().is_empty());
    assert_eq!(observer.count(), 0);
}

#[tokio::test]
async fn history_execution_failure_returns_generic_500_and_notifies_once() {
    let runner = RecordingRunner::failing();
    let observer: Arc<CountingObserver> = Arc::default();
    let app = test_app(runner.clone(), observer.clone());

    let response = post_json(
        app,
        "/treatment-plan/history",
        json!({"UserId": 7, "PatientId": 42}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["message"], json!("Something went wrong"));
    // Failure detail stays out of the response
    assert!(!body["message"].as_str().unwrap().contains("deadlock"));

    assert_eq!(observer.count(), 1);
}

// =============================================================================
// Save Endpoint
// =============================================================================

#[tokio::test]
async fn save_builds_table_param_with_fixed_column_order() {
    let runner = RecordingRunner::succeeding();
    let app = test_app(runner.clone(), Arc::default());

    let response = post_json(app, "/treatment-plan/save", save_body()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["message"], json!("Data save Successfully"));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].procedure, "TreatmentPlanSave");

    let table = match calls[0].params.last() {
        Some(SpParam::Table(table)) => table,
        other => panic!("expected trailing table param, got {:?}", other),
    };

    // Row count tracks the request array; column order is fixed regardless
    // of key order in the input objects.
    assert_eq!(table.rows.len(), 2);
    let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        columns,
        vec![
            "StartDate",
            "EndDate",
            "TreatmentStatus",
            "SelectedTeethPath",
            "TeethUpSelectedPath",
            "TeethSideSelectedPath",
            "TeethImageFileName",
            "DrawData",
            "CDTCode",
            "Info",
        ]
    );
}

#[tokio::test]
async fn save_missing_row_field_short_circuits_with_422() {
    let runner = RecordingRunner::succeeding();
    let app = test_app(runner.clone(), Arc::default());

    let mut body = save_body();
    body["TreatmentData"][1]
        .as_object_mut()
        .unwrap()
        .remove("TreatmentStatus");

    let response = post_json(app, "/treatment-plan/save", body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["data"][0]["field"], json!("TreatmentData[1].TreatmentStatus"));
    assert!(runner.calls().is_empty());
}

/// A runner that renders the batch like the real one before succeeding, so
/// marshal failures surface through the HTTP layer.
struct RenderingRunner;

#[async_trait]
impl ProcedureRunner for RenderingRunner {
    async fn execute(&self, call: SpCall) -> Result<SpResult, ServerError> {
        render_batch(&call)?;
        Ok(SpResult::default())
    }
}

#[tokio::test]
async fn save_unparseable_date_is_an_execution_failure_not_a_silent_null() {
    let observer: Arc<CountingObserver> = Arc::default();
    let app = router(AppState::with_parts(
        Arc::new(RenderingRunner),
        observer.clone(),
    ));

    let mut body = save_body();
    body["TreatmentData"][0]["StartDate"] = json!("05/01/2026");

    let response = post_json(app, "/treatment-plan/save", body).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["message"], json!("Something went wrong"));
    assert_eq!(observer.count(), 1);
}

#[tokio::test]
async fn save_execution_failure_notifies_observer_once() {
    let runner = RecordingRunner::failing();
    let observer: Arc<CountingObserver> = Arc::default();
    let app = test_app(runner.clone(), observer.clone());

    let response = post_json(app, "/treatment-plan/save", save_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(observer.count(), 1);
    // The call reached the runner before failing
    assert_eq!(runner.calls().len(), 1);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let app = test_app(RecordingRunner::succeeding(), Arc::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
