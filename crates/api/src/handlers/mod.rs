pub mod operations;
pub mod templates;
