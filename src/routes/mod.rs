pub mod applications;
pub mod employees;
pub mod health;
pub mod jobs;
pub mod verify;
