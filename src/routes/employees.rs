use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::employee_dto::{CreateEmployeePayload, UpdateEmployeePayload, UpdatePasswordPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Employee account created"),
        (status = 400, description = "Invalid payload or duplicate username")
    )
)]
#[axum::debug_handler]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let employee = state.employee_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "List of employee accounts")
    )
)]
#[axum::debug_handler]
pub async fn list_employees(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let employees = state.employee_service.list().await?;
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found"),
        (status = 404, description = "Employee not found")
    )
)]
#[axum::debug_handler]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let employee = state.employee_service.get(id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployeePayload,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 404, description = "Employee not found")
    )
)]
#[axum::debug_handler]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<impl IntoResponse> {
    let employee = state.employee_service.update(id, payload).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}/password",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    request_body = UpdatePasswordPayload,
    responses(
        (status = 204, description = "Password updated"),
        (status = 404, description = "Employee not found")
    )
)]
#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .employee_service
        .update_password(id, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/employees/{id}/toggle-status",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Status toggled"),
        (status = 404, description = "Employee not found")
    )
)]
#[axum::debug_handler]
pub async fn toggle_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let employee = state.employee_service.toggle_status(id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.employee_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
