pub mod api;
pub mod error;
pub mod models;
pub mod validate;
