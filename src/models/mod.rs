pub mod application;
pub mod employee;
pub mod job;
pub mod verification;
