pub mod accounts;
pub mod auth;
pub mod dashboard;
pub mod students;
