pub mod file;
pub mod resume;
