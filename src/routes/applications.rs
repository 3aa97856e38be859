use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use validator::Validate;

use crate::{
    dto::application_dto::{
        CreateApplicationPayload, InterviewNotesPayload, Phase1DecisionPayload,
        Phase2DecisionPayload, StatsResponse,
    },
    error::Result,
    services::workflow_service::Phase2Decision,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ApplicationListQuery {
    pub job_id: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application submitted"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Referenced job not found")
    )
)]
#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state.application_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    params(
        ("job_id" = Option<i64>, Query, description = "Filter by job posting")
    ),
    responses(
        (status = 200, description = "List of applications")
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let applications = match query.job_id {
        Some(job_id) => state.application_service.list_by_job(job_id).await?,
        None => state.application_service.list().await?,
    };
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(id).await?;
    Ok(Json(application))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.application_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/phase1",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    request_body = Phase1DecisionPayload,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 400, description = "Invalid decision or application already decided"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn phase1_decision(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Phase1DecisionPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .workflow_service
        .decide_phase1(
            id,
            payload.decision,
            payload.interview_date.as_deref(),
            payload.rejection_reason.as_deref(),
        )
        .await?;
    Ok(Json(application))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/phase2",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    request_body = Phase2DecisionPayload,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 400, description = "Invalid decision or application not interview-ready"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn phase2_decision(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Phase2DecisionPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .workflow_service
        .decide_phase2(id, payload.decision, payload.rejection_reason.as_deref())
        .await?;

    // The acceptance letter is generated after the transition commits;
    // failures are retryable via the regeneration endpoint.
    if payload.decision == Phase2Decision::Accepted {
        if let Err(e) = state.workflow_service.ensure_acceptance_letter(id).await {
            warn!(application_id = id, error = %e, "acceptance letter generation failed");
        }
    }

    let application = match state.application_service.get(id).await {
        Ok(refreshed) => refreshed,
        Err(_) => application,
    };
    Ok(Json(application))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/documents/interview-invitation",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Convocation generated"),
        (status = 400, description = "Application not selected for interview"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn regenerate_convocation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let filename = state.workflow_service.ensure_interview_invitation(id).await?;
    Ok(Json(json!({ "filename": filename })))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/documents/acceptance-letter",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Acceptance letter generated"),
        (status = 400, description = "Application not accepted"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn regenerate_acceptance_letter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let filename = state.workflow_service.ensure_acceptance_letter(id).await?;
    Ok(Json(json!({ "filename": filename })))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/notifications/{phase}",
    params(
        ("id" = i64, Path, description = "Application ID"),
        ("phase" = u8, Path, description = "Workflow phase (1 or 2)")
    ),
    responses(
        (status = 204, description = "Notification flag recorded"),
        (status = 400, description = "Unknown phase"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_notification_sent(
    State(state): State<AppState>,
    Path((id, phase)): Path<(i64, u8)>,
) -> Result<impl IntoResponse> {
    state.workflow_service.mark_notification_sent(id, phase).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/interview-notes",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    request_body = InterviewNotesPayload,
    responses(
        (status = 204, description = "Notes saved"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn add_interview_notes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<InterviewNotesPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .workflow_service
        .add_interview_notes(id, &payload.notes)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/verifications",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Verification records for the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn list_verifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let records = state
        .application_service
        .verification_history(&state.verification_service, id)
        .await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = Json<StatsResponse>)
    )
)]
#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.application_service.stats().await?;
    Ok(Json(stats))
}
