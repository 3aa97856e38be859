pub mod crypto;
pub mod time;
