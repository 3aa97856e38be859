use crate::error::{Error, Result};
use crate::models::verification::{DocumentType, VerificationRecord};
use chrono::{NaiveDate, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

/// Source of truth for "is this code valid, and what does it attest to".
///
/// Codes are derived from a random salt, so collisions are statistically
/// negligible; the UNIQUE constraint on the code column is the only guard.
#[derive(Clone)]
pub struct VerificationService {
    pool: SqlitePool,
}

impl VerificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 16-character uppercase hex code: SHA-256 over a random salt combined
    /// with the application id, document type and issuance timestamp.
    pub fn generate_code(application_id: i64, document_type: DocumentType) -> String {
        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let data = format!(
            "{}-{}-{}-{}",
            hex::encode(salt),
            application_id,
            document_type.as_str(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let digest = Sha256::digest(data.as_bytes());
        hex::encode(digest)[..16].to_uppercase()
    }

    pub async fn issue(
        &self,
        application_id: i64,
        document_type: DocumentType,
        candidate_name: &str,
        job_title: &str,
        issue_date: NaiveDate,
        pdf_filename: &str,
    ) -> Result<VerificationRecord> {
        let code = Self::generate_code(application_id, document_type);
        let record = sqlx::query_as::<_, VerificationRecord>(
            r#"
            INSERT INTO document_verifications
                (code, application_id, document_type, candidate_name, job_title,
                 issue_date, pdf_filename, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'valid', ?)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(application_id)
        .bind(document_type)
        .bind(candidate_name)
        .bind(job_title)
        .bind(issue_date)
        .bind(pdf_filename)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(record)
    }

    /// Case-sensitive exact match. Revoked records are still returned; the
    /// caller reports their status.
    pub async fn lookup(&self, code: &str) -> Result<Option<VerificationRecord>> {
        let record = sqlx::query_as::<_, VerificationRecord>(
            "SELECT * FROM document_verifications WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn revoke(&self, code: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE document_verifications SET status = 'revoked' WHERE code = ?")
                .bind(code)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "Verification code {} does not exist",
                code
            )));
        }
        Ok(())
    }

    /// All records bound to an application, newest issuance first.
    pub async fn list_for_application(
        &self,
        application_id: i64,
    ) -> Result<Vec<VerificationRecord>> {
        let records = sqlx::query_as::<_, VerificationRecord>(
            "SELECT * FROM document_verifications WHERE application_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::verification::VerificationStatus;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");
        crate::database::MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    #[test]
    fn generated_codes_are_short_and_uppercase() {
        let code = VerificationService::generate_code(42, DocumentType::InterviewInvitation);
        assert_eq!(code.len(), 16);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn repeated_issuance_produces_distinct_codes() {
        let a = VerificationService::generate_code(7, DocumentType::AcceptanceLetter);
        let b = VerificationService::generate_code(7, DocumentType::AcceptanceLetter);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn issue_then_lookup_returns_issuance_metadata() {
        let service = VerificationService::new(setup_test_db().await);
        let issue_date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let record = service
            .issue(
                3,
                DocumentType::InterviewInvitation,
                "Awa Hassan",
                "Comptable",
                issue_date,
                "Convocation_Entretien_Awa_Hassan_3_20251001_090000.pdf",
            )
            .await
            .expect("issue");

        let found = service
            .lookup(&record.code)
            .await
            .expect("lookup")
            .expect("record present");
        assert_eq!(found.application_id, 3);
        assert_eq!(found.document_type, DocumentType::InterviewInvitation);
        assert_eq!(found.candidate_name, "Awa Hassan");
        assert_eq!(found.job_title, "Comptable");
        assert_eq!(found.issue_date, issue_date);
        assert_eq!(found.status, VerificationStatus::Valid);
    }

    #[tokio::test]
    async fn lookup_is_exact_and_misses_return_none() {
        let service = VerificationService::new(setup_test_db().await);
        let record = service
            .issue(
                1,
                DocumentType::AcceptanceLetter,
                "Omar Ali",
                "Chauffeur",
                NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
                "Lettre_Acceptation_Omar_Ali_1_20250902_120000.pdf",
            )
            .await
            .unwrap();

        assert!(service
            .lookup(&record.code.to_lowercase())
            .await
            .unwrap()
            .is_none());
        assert!(service.lookup("DOESNOTEXIST0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoked_codes_still_resolve_with_revoked_status() {
        let service = VerificationService::new(setup_test_db().await);
        let record = service
            .issue(
                5,
                DocumentType::InterviewInvitation,
                "Mariam Said",
                "Secrétaire",
                NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
                "Convocation_Entretien_Mariam_Said_5_20251120_080000.pdf",
            )
            .await
            .unwrap();

        service.revoke(&record.code).await.expect("revoke");
        let found = service.lookup(&record.code).await.unwrap().unwrap();
        assert_eq!(found.status, VerificationStatus::Revoked);

        let err = service.revoke("UNKNOWNCODE00000").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
