use crate::error::Result;
use crate::models::verification::DocumentType;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File storage collaborator. Generated documents live under
/// `{root}/{collection}` (convocations, acceptances); candidate attachments
/// under `{root}/uploads`.
#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Candidate name reduced to `[A-Za-z0-9_-]`: whitespace and hyphen runs
    /// become a single underscore, anything else is dropped.
    pub fn clean_candidate_name(name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut pending_sep = false;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push(c);
            } else if c.is_whitespace() || c == '-' {
                pending_sep = true;
            }
        }
        out
    }

    /// `{Label}_{cleaned_name}_{id}_{yyyymmdd_HHMMSS}.pdf`
    pub fn document_filename(
        document_type: DocumentType,
        candidate_name: &str,
        application_id: i64,
        at: &DateTime<Utc>,
    ) -> String {
        format!(
            "{}_{}_{}_{}.pdf",
            document_type.filename_label(),
            Self::clean_candidate_name(candidate_name),
            application_id,
            crate::utils::time::timestamp_slug(at)
        )
    }

    pub fn document_path(&self, document_type: DocumentType, filename: &str) -> PathBuf {
        self.root.join(document_type.collection()).join(filename)
    }

    pub fn upload_path(&self, filename: &str) -> PathBuf {
        self.root.join("uploads").join(filename)
    }

    pub async fn store_document(
        &self,
        document_type: DocumentType,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.root.join(document_type.collection());
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Returns whether a file was actually removed.
    pub async fn delete_document(
        &self,
        document_type: DocumentType,
        filename: &str,
    ) -> Result<bool> {
        Self::remove_if_exists(&self.document_path(document_type, filename)).await
    }

    pub async fn delete_upload(&self, filename: &str) -> Result<bool> {
        Self::remove_if_exists(&self.upload_path(filename)).await
    }

    async fn remove_if_exists(path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_names_are_sanitized() {
        assert_eq!(
            StorageService::clean_candidate_name("Awa  Hassan-Oubah"),
            "Awa_Hassan_Oubah"
        );
        // accented chars, apostrophes and parens are dropped
        assert_eq!(
            StorageService::clean_candidate_name("Aïcha N'Doye (CV)"),
            "Acha_NDoye_CV"
        );
        assert_eq!(StorageService::clean_candidate_name("  "), "");
    }

    #[test]
    fn filename_follows_convention() {
        let at = DateTime::parse_from_rfc3339("2025-10-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let name = StorageService::document_filename(
            DocumentType::InterviewInvitation,
            "Awa Hassan",
            3,
            &at,
        );
        assert_eq!(name, "Convocation_Entretien_Awa_Hassan_3_20251001_090000.pdf");
        assert!(name
            .trim_end_matches(".pdf")
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[tokio::test]
    async fn store_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        let path = storage
            .store_document(DocumentType::AcceptanceLetter, "test.pdf", b"%PDF-stub")
            .await
            .expect("store");
        assert!(path.ends_with("acceptances/test.pdf"));
        assert!(path.exists());

        assert!(storage
            .delete_document(DocumentType::AcceptanceLetter, "test.pdf")
            .await
            .unwrap());
        assert!(!path.exists());
        // deleting again is a no-op
        assert!(!storage
            .delete_document(DocumentType::AcceptanceLetter, "test.pdf")
            .await
            .unwrap());
    }
}
