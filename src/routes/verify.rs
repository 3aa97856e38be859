use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{dto::verify_dto::VerifyResponse, error::Result, AppState};

/// Public endpoint behind the QR code printed on generated documents.
/// Always answers 200; the `status` field distinguishes valid, revoked and
/// unknown codes so scanners get a uniform shape.
#[utoipa::path(
    get,
    path = "/verify/{code}",
    params(
        ("code" = String, Path, description = "16-character verification code")
    ),
    responses(
        (status = 200, description = "Verification result", body = Json<VerifyResponse>)
    )
)]
#[axum::debug_handler]
pub async fn verify_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse> {
    let response = match state.verification_service.lookup(&code).await? {
        Some(record) => VerifyResponse::from_record(record),
        None => VerifyResponse::invalid(),
    };
    Ok(Json(response))
}
