pub mod application_service;
pub mod document_service;
pub mod employee_service;
pub mod job_service;
pub mod storage_service;
pub mod verification_service;
pub mod workflow_service;
