use salsabil_backend::config::Config;
use salsabil_backend::dto::application_dto::CreateApplicationPayload;
use salsabil_backend::error::Error;
use salsabil_backend::models::application::{Phase1Status, Phase2Status, WorkflowPhase};
use salsabil_backend::models::verification::DocumentType;
use salsabil_backend::services::workflow_service::{Phase1Decision, Phase2Decision};
use salsabil_backend::AppState;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

async fn setup() -> (AppState, TempDir) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool");
    salsabil_backend::database::MIGRATOR
        .run(&pool)
        .await
        .expect("migrations");

    let storage = TempDir::new().expect("tempdir");
    let config = Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: "sqlite::memory:".to_string(),
        base_url: "http://test.local".to_string(),
        storage_root: storage.path().to_string_lossy().into_owned(),
        fonts_dir: "assets/fonts".to_string(),
        logo_path: "assets/img/logo.jpeg".to_string(),
        render_timeout_secs: 30,
    };
    (AppState::new(pool, &config), storage)
}

fn candidate() -> CreateApplicationPayload {
    CreateApplicationPayload {
        job_id: None,
        first_name: "Awa".to_string(),
        last_name: "Hassan".to_string(),
        email: "awa.hassan@example.com".to_string(),
        phone: "+253 77 12 34 56".to_string(),
        address: Some("Quartier 4, Djibouti".to_string()),
        country: Some("Djibouti".to_string()),
        photo: None,
        cv: None,
        cover_letter: None,
        id_card: None,
        recommendation_letter: None,
        criminal_record: None,
        diploma: None,
    }
}

#[tokio::test]
async fn phase1_selection_schedules_interview_and_generates_convocation() {
    let (state, storage) = setup().await;
    let app = state.application_service.create(candidate()).await.unwrap();

    let decided = state
        .workflow_service
        .decide_phase1(
            app.id,
            Phase1Decision::SelectedForInterview,
            Some("2025-10-15T14:00"),
            None,
        )
        .await
        .expect("phase 1 selection");

    assert_eq!(decided.phase1_status, Phase1Status::SelectedForInterview);
    assert_eq!(decided.workflow_phase, WorkflowPhase::Phase1);
    assert_eq!(decided.status, "interview scheduled");
    assert_eq!(decided.interview_date.as_deref(), Some("2025-10-15T14:00"));
    assert!(decided.phase1_date.is_some());

    let filename = decided
        .interview_invitation_pdf
        .expect("convocation attached");
    let path = storage.path().join("convocations").join(&filename);
    let bytes = tokio::fs::read(&path).await.expect("pdf stored");
    assert!(bytes.starts_with(b"%PDF"));

    let records = state
        .verification_service
        .list_for_application(decided.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].document_type, DocumentType::InterviewInvitation);
    assert_eq!(records[0].pdf_filename, filename);
    assert_eq!(records[0].candidate_name, "Awa Hassan");
}

#[tokio::test]
async fn phase1_selection_without_interview_date_is_rejected() {
    let (state, _storage) = setup().await;
    let app = state.application_service.create(candidate()).await.unwrap();

    let err = state
        .workflow_service
        .decide_phase1(app.id, Phase1Decision::SelectedForInterview, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    // nothing changed
    let reloaded = state.application_service.get(app.id).await.unwrap();
    assert_eq!(reloaded.phase1_status, Phase1Status::Pending);
}

#[tokio::test]
async fn phase1_rejection_completes_the_workflow() {
    let (state, _storage) = setup().await;
    let app = state.application_service.create(candidate()).await.unwrap();

    let decided = state
        .workflow_service
        .decide_phase1(
            app.id,
            Phase1Decision::Rejected,
            None,
            Some("Profil ne correspond pas au poste"),
        )
        .await
        .unwrap();

    assert_eq!(decided.phase1_status, Phase1Status::Rejected);
    assert_eq!(decided.workflow_phase, WorkflowPhase::Completed);
    assert_eq!(decided.status, "rejected");
    assert_eq!(
        decided.rejection_reason.as_deref(),
        Some("Profil ne correspond pas au poste")
    );
    assert!(decided.interview_invitation_pdf.is_none());

    // a completed application cannot be decided again
    let err = state
        .workflow_service
        .decide_phase1(
            app.id,
            Phase1Decision::SelectedForInterview,
            Some("2025-10-15T14:00"),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn failed_convocation_generation_keeps_the_transition() {
    let (state, _storage) = setup().await;
    let mut payload = candidate();
    payload.address = None;
    let app = state.application_service.create(payload).await.unwrap();

    let decided = state
        .workflow_service
        .decide_phase1(
            app.id,
            Phase1Decision::SelectedForInterview,
            Some("2025-10-15T14:00"),
            None,
        )
        .await
        .expect("transition survives generation failure");

    assert_eq!(decided.phase1_status, Phase1Status::SelectedForInterview);
    assert!(decided.interview_invitation_pdf.is_none());

    // retry still fails while the address is missing
    let err = state
        .workflow_service
        .ensure_interview_invitation(app.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingField(_)));

    // once the data is fixed the retry succeeds
    sqlx::query("UPDATE applications SET address = 'Boulaos, Djibouti' WHERE id = ?")
        .bind(app.id)
        .execute(&state.pool)
        .await
        .unwrap();
    let filename = state
        .workflow_service
        .ensure_interview_invitation(app.id)
        .await
        .expect("retry");
    let reloaded = state.application_service.get(app.id).await.unwrap();
    assert_eq!(reloaded.interview_invitation_pdf.as_deref(), Some(filename.as_str()));
}

#[tokio::test]
async fn phase2_acceptance_completes_and_attaches_letter() {
    let (state, storage) = setup().await;
    let app = state.application_service.create(candidate()).await.unwrap();

    // phase 2 before phase 1 is refused
    let err = state
        .workflow_service
        .decide_phase2(app.id, Phase2Decision::Accepted, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    state
        .workflow_service
        .decide_phase1(
            app.id,
            Phase1Decision::SelectedForInterview,
            Some("2025-10-15T14:00"),
            None,
        )
        .await
        .unwrap();

    let decided = state
        .workflow_service
        .decide_phase2(app.id, Phase2Decision::Accepted, None)
        .await
        .unwrap();
    assert_eq!(decided.phase2_status, Some(Phase2Status::Accepted));
    assert_eq!(decided.workflow_phase, WorkflowPhase::Completed);
    assert_eq!(decided.status, "accepted");

    let filename = state
        .workflow_service
        .ensure_acceptance_letter(app.id)
        .await
        .expect("acceptance letter");
    let path = storage.path().join("acceptances").join(&filename);
    let bytes = tokio::fs::read(&path).await.expect("pdf stored");
    assert!(bytes.starts_with(b"%PDF"));

    // both documents issued codes
    let records = state
        .verification_service
        .list_for_application(app.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    // deciding again is refused
    let err = state
        .workflow_service
        .decide_phase2(app.id, Phase2Decision::Rejected, Some("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn phase2_rejection_requires_a_reason() {
    let (state, _storage) = setup().await;
    let app = state.application_service.create(candidate()).await.unwrap();
    state
        .workflow_service
        .decide_phase1(
            app.id,
            Phase1Decision::SelectedForInterview,
            Some("2025-10-15T14:00"),
            None,
        )
        .await
        .unwrap();

    let err = state
        .workflow_service
        .decide_phase2(app.id, Phase2Decision::Rejected, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let decided = state
        .workflow_service
        .decide_phase2(app.id, Phase2Decision::Rejected, Some("Entretien non concluant"))
        .await
        .unwrap();
    assert_eq!(decided.phase2_status, Some(Phase2Status::Rejected));
    assert_eq!(decided.status, "rejected");
}

#[tokio::test]
async fn notification_flags_are_idempotent() {
    let (state, _storage) = setup().await;
    let app = state.application_service.create(candidate()).await.unwrap();

    state
        .workflow_service
        .mark_notification_sent(app.id, 1)
        .await
        .unwrap();
    state
        .workflow_service
        .mark_notification_sent(app.id, 1)
        .await
        .unwrap();
    let reloaded = state.application_service.get(app.id).await.unwrap();
    assert!(reloaded.phase1_notification_sent);
    assert!(!reloaded.phase2_notification_sent);

    let err = state
        .workflow_service
        .mark_notification_sent(app.id, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}
