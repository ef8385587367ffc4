use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::{
    state::AppState,
    students::{
        dto::{
            LoadDataResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
            SaveDataRequest, SaveDataResponse,
        },
        error::StoreError,
        repo_types::NewStudent,
    },
};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/save-data", post(save_data))
        .route("/student-data/:student_id", get(student_data))
}

/// Failure envelope: `{"success": false, "error": ...}` with the status
/// class chosen by the handler.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "error": self.1 }));
        (self.0, body).into_response()
    }
}

fn internal(err: StoreError) -> ApiError {
    error!(error = %err, "store failure");
    ApiError(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        warn!("register missing username or password");
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "Username and password are required".into(),
        ));
    }

    let student = state
        .store
        .register(NewStudent {
            username: payload.username,
            password: payload.password,
            email: payload.email,
            full_name: payload.full_name,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => {
                warn!("register duplicate username");
                ApiError(StatusCode::BAD_REQUEST, e.to_string())
            }
            other => internal(other),
        })?;

    info!(student_id = student.id, username = %student.username, "student registered");
    Ok(Json(RegisterResponse {
        success: true,
        message: "Registration successful".into(),
        student: student.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        warn!("login missing username or password");
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "Username and password are required".into(),
        ));
    }

    let student = match state.store.login(&payload.username, &payload.password).await {
        Ok(s) => s,
        // One message for both kinds, so clients cannot probe usernames.
        Err(e) if e.is_auth_failure() => {
            warn!(username = %payload.username, reason = %e, "login rejected");
            return Err(ApiError(
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".into(),
            ));
        }
        Err(e) => return Err(internal(e)),
    };

    let data = state.store.load_data(student.id).await.map_err(internal)?;

    info!(student_id = student.id, "student logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        student,
        progress: data.progress,
        study_plan: data.study_plan,
    }))
}

#[instrument(skip(state, payload))]
pub async fn save_data(
    State(state): State<AppState>,
    Json(payload): Json<SaveDataRequest>,
) -> Result<Json<SaveDataResponse>, ApiError> {
    let student_id = payload.student_id.ok_or_else(|| {
        warn!("save-data missing studentId");
        ApiError(StatusCode::BAD_REQUEST, "Student ID is required".into())
    })?;

    state
        .store
        .save_data(student_id, payload.progress, payload.study_plan)
        .await
        .map_err(internal)?;

    Ok(Json(SaveDataResponse {
        success: true,
        message: "Data saved successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn student_data(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<LoadDataResponse>, ApiError> {
    let data = state.store.load_data(student_id).await.map_err(internal)?;
    Ok(Json(LoadDataResponse {
        success: true,
        data,
    }))
}
