pub mod course_materials;
pub mod home;
pub mod material_requests;
pub mod news;
pub mod reference;
pub mod search;
pub mod students;
pub mod teachers;
pub mod users;

/// Stored text that does not name a known enum value.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("Invalid role: {0}")]
    Role(String),
    #[error("Invalid request status: {0}")]
    RequestStatus(String),
}
