//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Member joined with its user identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub user_id: i32,
    pub email: String,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

/// Entry of the most active members ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopActiveMember {
    pub id: i32,
    pub email: String,
    pub username: String,
    /// Number of loans not yet returned
    pub active_loan: i64,
}

/// Create member request (also creates the user identity)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
}

/// Update member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: Option<String>,
}
