use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct News {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_date: NaiveDateTime,
    pub publish_date: Option<NaiveDateTime>,
    pub is_published: bool,
    pub author: Option<String>,
}

impl News {
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published
    }
}

#[derive(Validate, Deserialize, Serialize, Debug, Clone)]
pub struct NewsPayload {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
    pub publish_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_date: NaiveDateTime,
    pub publish_date: Option<NaiveDateTime>,
    pub is_published: bool,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Promotion {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub discount: Option<String>,
}

impl Promotion {
    pub fn is_publicly_visible(&self, now: NaiveDateTime) -> bool {
        self.is_active && self.end_date >= now
    }
}

#[derive(Validate, Deserialize, Serialize, Debug, Clone)]
#[validate(schema(function = "validate_promotion_dates", skip_on_field_errors = false))]
pub struct PromotionPayload {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    #[validate(length(max = 50, message = "Discount must be at most 50 characters"))]
    pub discount: Option<String>,
}

fn validate_promotion_dates(payload: &PromotionPayload) -> Result<(), ValidationError> {
    match (payload.start_date, payload.end_date) {
        (Some(start), Some(end)) if end < start => {
            let mut error = ValidationError::new("promotion_dates");
            error.message = Some("End date must not precede start date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub discount: Option<String>,
}
