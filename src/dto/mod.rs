pub mod application_dto;
pub mod employee_dto;
pub mod job_dto;
pub mod verify_dto;
