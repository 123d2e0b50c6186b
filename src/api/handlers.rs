//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::store::Backend;

use super::request::{RunPayrollRequest, RunPayrollResponse};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Header a caller may use to choose the request id a job id is derived from.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the API router with all endpoints.
pub fn create_router<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/periods/:period_id", get(period_handler::<B>))
        .route("/periods/:period_id/payroll", post(run_payroll_handler::<B>))
        .route("/periods/:period_id/summary", get(summary_handler::<B>))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn path_error(correlation_id: &str, rejection: PathRejection) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %rejection.body_text(),
        "Invalid period id"
    );
    error_response(ApiErrorResponse::bad_request(ApiError::invalid_path(
        "period_id must be a positive integer",
    )))
}

/// Handler for POST /periods/:period_id/payroll.
///
/// Validates the period and queues a run, answering `202 Accepted` before
/// any employee is computed.
async fn run_payroll_handler<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    period_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = request_id(&headers);
    info!(correlation_id = %correlation_id, "Processing payroll run request");

    let period_id = match period_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_error(&correlation_id, rejection),
    };

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return error_response(ApiErrorResponse::bad_request(error));
        }
    };

    match state
        .coordinator()
        .run_with_request_id(period_id, request.initiator_id, correlation_id.clone())
        .await
    {
        Ok(handle) => {
            info!(
                correlation_id = %correlation_id,
                period_id,
                job_id = %handle.job_id,
                "Payroll run queued"
            );
            // The run reports through the period status; nobody waits on the handle.
            json_response(StatusCode::ACCEPTED, RunPayrollResponse::from(&handle))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                period_id,
                error = %err,
                "Payroll run rejected"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /periods/:period_id.
async fn period_handler<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    period_id: Result<Path<u64>, PathRejection>,
) -> Response {
    let correlation_id = request_id(&headers);
    let period_id = match period_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_error(&correlation_id, rejection),
    };

    match state.coordinator().period(period_id).await {
        Ok(period) => json_response(StatusCode::OK, period),
        Err(err) => {
            warn!(correlation_id = %correlation_id, period_id, error = %err, "Period lookup failed");
            error_response(err.into())
        }
    }
}

/// Handler for GET /periods/:period_id/summary.
async fn summary_handler<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    period_id: Result<Path<u64>, PathRejection>,
) -> Response {
    let correlation_id = request_id(&headers);
    let period_id = match period_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_error(&correlation_id, rejection),
    };

    match state.coordinator().summary(period_id).await {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                period_id,
                total_employees = summary.total_employees,
                "Summary served"
            );
            json_response(StatusCode::OK, summary)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, period_id, error = %err, "Summary failed");
            error_response(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::calculation::CalculationPolicy;
    use crate::config::WorkerConfig;
    use crate::models::{Employee, Period, PeriodStatus, PeriodSummary, Role};
    use crate::run::{BackgroundRunner, RunCoordinator, RunWorkerPool};
    use crate::store::MemoryBackend;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn create_period(id: u64, status: PeriodStatus) -> Period {
        Period {
            id,
            code: format!("PRD-{id}"),
            name: format!("Period {id}"),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status,
            executed_by: None,
            executed_at: None,
        }
    }

    async fn create_test_state() -> (Arc<MemoryBackend>, RunWorkerPool, AppState<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(create_period(1, PeriodStatus::Active)).await;
        backend.insert_period(create_period(2, PeriodStatus::Completed)).await;
        backend
            .insert_employee(Employee {
                id: 1,
                username: "dewi".to_string(),
                salary: Decimal::from(2_200_000),
                role: Role::Employee,
            })
            .await;
        let runner = Arc::new(BackgroundRunner::new(
            backend.clone(),
            50,
            CalculationPolicy::default(),
        ));
        let pool = RunWorkerPool::start(
            runner,
            WorkerConfig {
                count: 1,
                queue_capacity: 4,
            },
        );
        let state = AppState::new(RunCoordinator::new(backend.clone(), pool.queue()));
        (backend, pool, state)
    }

    fn run_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .header(REQUEST_ID_HEADER, "req-1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_run_is_accepted_with_job_id() {
        let (backend, pool, state) = create_test_state().await;
        let router = create_router(state);

        let response = router
            .oneshot(run_request("/periods/1/payroll", r#"{"initiator_id": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body: RunPayrollResponse = read_body(response).await;
        assert_eq!(body.job_id, "payroll_1_req-1");
        assert_eq!(body.status_message, "Payroll processing started");

        pool.shutdown().await;
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Completed);
    }

    #[tokio::test]
    async fn test_run_on_completed_period_is_409() {
        let (_backend, pool, state) = create_test_state().await;
        let router = create_router(state);

        let response = router
            .oneshot(run_request("/periods/2/payroll", r#"{"initiator_id": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "INVALID_STATE");
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_run_on_missing_period_is_404() {
        let (_backend, pool, state) = create_test_state().await;
        let router = create_router(state);

        let response = router
            .oneshot(run_request("/periods/404/payroll", r#"{"initiator_id": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (backend, pool, state) = create_test_state().await;
        let router = create_router(state);

        let response = router
            .oneshot(run_request("/periods/1/payroll", "{invalid json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "MALFORMED_JSON");
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Active);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_initiator_returns_400() {
        let (_backend, pool, state) = create_test_state().await;
        let router = create_router(state);

        let response = router
            .oneshot(run_request("/periods/1/payroll", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_non_numeric_period_returns_400() {
        let (_backend, pool, state) = create_test_state().await;
        let router = create_router(state);

        let response = router
            .oneshot(run_request("/periods/abc/payroll", r#"{"initiator_id": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "INVALID_PATH");
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_period_and_summary() {
        let (_backend, pool, state) = create_test_state().await;
        state
            .coordinator()
            .run(1, 42)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        let router = create_router(state);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/periods/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let period: Period = read_body(response).await;
        assert_eq!(period.status, PeriodStatus::Completed);
        assert_eq!(period.executed_by, Some(42));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/periods/1/summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let summary: PeriodSummary = read_body(response).await;
        assert_eq!(summary.total_employees, 1);
        pool.shutdown().await;
    }

    #[test]
    fn test_request_id_falls_back_to_uuid() {
        let mut headers = HeaderMap::new();
        let generated = request_id(&headers);
        assert!(Uuid::parse_str(&generated).is_ok());

        headers.insert(REQUEST_ID_HEADER, "  abc  ".parse().unwrap());
        assert_eq!(request_id(&headers), "abc");
    }
}
