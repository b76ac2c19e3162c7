//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Update author request
///
/// Omitted fields are left unchanged; `bio` and `birth_date` are cleared by
/// an explicit `null`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<Option<NaiveDate>>,
}
