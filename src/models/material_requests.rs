use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ModelParseError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Completed => "Completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Rejected" => Ok(RequestStatus::Rejected),
            "Completed" => Ok(RequestStatus::Completed),
            other => Err(ModelParseError::RequestStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = ModelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct MaterialRequest {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub material_type: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_date: NaiveDateTime,
    pub processed_date: Option<NaiveDateTime>,
    pub completed_date: Option<NaiveDateTime>,
    pub admin_comment: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Request is already completed and can no longer change status")]
    AlreadyCompleted,
}

impl MaterialRequest {
    /// Moves the request to `status`. Approved and Rejected stamp the
    /// processed date, Completed stamps the completed date. Completed is final.
    pub fn transition(
        &mut self,
        status: RequestStatus,
        comment: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::AlreadyCompleted);
        }

        match status {
            RequestStatus::Approved | RequestStatus::Rejected => self.processed_date = Some(now),
            RequestStatus::Completed => self.completed_date = Some(now),
            RequestStatus::Pending => {}
        }
        self.status = status;
        self.admin_comment = comment;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MaterialRequestWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: MaterialRequest,
    pub user_login: Option<String>,
}

#[derive(Validate, Deserialize, Serialize, Debug, Clone)]
pub struct CreateMaterialRequestPayload {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(max = 50, message = "Material type must be at most 50 characters"))]
    pub material_type: Option<String>,
    #[validate(length(max = 200, message = "File URL must be at most 200 characters"))]
    pub file_url: Option<String>,
}

#[derive(Validate, Deserialize, Debug)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}
