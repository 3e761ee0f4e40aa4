use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use course_core::{
    types::PublishRequest, ApiError, Course, CoursePatch, CourseQuery, DeleteAck, ListResult, LocalStore, NewCourse,
    StorageAdapter, StoreOptions,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{debug, warn};

/// Makes the next `count` course requests answer with `status`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultPlan {
    pub status: u16,
    pub count: u32,
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<LocalStore>,
    faults: Arc<Mutex<Option<FaultPlan>>>,
}

impl AppState {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store: Arc::new(store),
            faults: Arc::new(Mutex::new(None)),
        }
    }

    async fn take_fault(&self) -> Option<u16> {
        let mut faults = self.faults.lock().await;
        let plan = faults.as_mut()?;
        if plan.count == 0 {
            *faults = None;
            return None;
        }
        plan.count -= 1;
        Some(plan.status)
    }
}

/// Router over a fresh, seeded in-memory store.
pub fn app() -> Router {
    let store = LocalStore::new(StorageAdapter::in_memory("mock-server"), StoreOptions::default());
    app_with_state(AppState::new(store))
}

pub fn app_with_state(state: AppState) -> Router {
    let courses = Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course).put(update_course).delete(delete_course))
        .route("/courses/{id}/publish", post(set_published))
        .route_layer(middleware::from_fn_with_state(state.clone(), inject_faults));

    Router::new()
        .merge(courses)
        .route("/__faults", post(set_faults))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Maps store errors onto HTTP statuses.
struct Failure(ApiError);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0.info())).into_response()
    }
}

async fn inject_faults(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(status) = state.take_fault().await {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!(%status, uri = %request.uri(), "injecting fault");
        return (status, "injected fault").into_response();
    }
    next.run(request).await
}

async fn set_faults(State(state): State<AppState>, Json(plan): Json<FaultPlan>) -> StatusCode {
    debug!(?plan, "fault plan installed");
    *state.faults.lock().await = Some(plan);
    StatusCode::NO_CONTENT
}

async fn list_courses(State(state): State<AppState>, Query(query): Query<CourseQuery>) -> Json<ListResult> {
    Json(state.store.list(&query).await)
}

async fn create_course(State(state): State<AppState>, Json(input): Json<NewCourse>) -> (StatusCode, Json<Course>) {
    let course = state.store.create(input).await;
    (StatusCode::CREATED, Json(course))
}

async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Course>, Failure> {
    state.store.get(&id).await.map(Json).map_err(Failure)
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CoursePatch>,
) -> Result<Json<Course>, Failure> {
    state.store.update(&id, patch).await.map(Json).map_err(Failure)
}

async fn delete_course(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DeleteAck>, Failure> {
    state.store.delete(&id).await.map(Json).map_err(Failure)
}

async fn set_published(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<Course>, Failure> {
    state.store.set_published(&id, body.published).await.map(Json).map_err(Failure)
}
